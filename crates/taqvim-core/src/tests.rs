//! Service tests against an in-memory `CalendarStore` that can be told to
//! fail a given operation.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
  Error,
  calendar::{
    CalendarCounts, Day, DayFilter, DayId, Month, MonthFilter, MonthId, NewDay,
    NewMonth, Note, SLOTS_PER_DAY, Slot, SlotFilter, SlotId, Tag,
  },
  mutation::{MutationService, reconcile_tags},
  seed::{CalendarSeeder, SeedRange},
  store::CalendarStore,
};

// ─── Memory store ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("injected failure in {0}")]
struct Injected(&'static str);

#[derive(Default)]
struct State {
  next_id: i64,
  months:  Vec<Month>,
  days:    Vec<Day>,
  slots:   Vec<Slot>,
  notes:   Vec<Note>,
  tags:    Vec<Tag>,
}

impl State {
  fn id(&mut self) -> i64 {
    self.next_id += 1;
    self.next_id
  }

  fn has_slot(&self, slot_id: SlotId) -> bool { self.slots.iter().any(|s| s.id == slot_id) }
}

/// A store whose `n`th call to a named operation fails once.
#[derive(Default)]
struct MemoryStore {
  state:    Mutex<State>,
  /// Operation name to the number of calls still allowed to succeed.
  failures: Mutex<HashMap<&'static str, usize>>,
}

impl MemoryStore {
  /// Let `op` succeed `successes` more times, then fail the next call.
  fn fail_after(&self, op: &'static str, successes: usize) {
    self.failures.lock().unwrap().insert(op, successes);
  }

  fn check(&self, op: &'static str) -> Result<(), Injected> {
    let mut failures = self.failures.lock().unwrap();
    let Some(left) = failures.get_mut(op) else { return Ok(()) };
    if *left > 0 {
      *left -= 1;
      return Ok(());
    }
    failures.remove(op);
    Err(Injected(op))
  }

  fn state(&self) -> std::sync::MutexGuard<'_, State> { self.state.lock().unwrap() }
}

impl CalendarStore for MemoryStore {
  type Error = Injected;

  async fn find_month_by_name(&self, name: &str) -> Result<Option<Month>, Injected> {
    self.check("find_month_by_name")?;
    Ok(self.state().months.iter().find(|m| m.name == name).cloned())
  }

  async fn create_month(&self, input: NewMonth) -> Result<Month, Injected> {
    self.check("create_month")?;
    let mut state = self.state();
    let month = Month { id: state.id(), name: input.name, season: input.season };
    state.months.push(month.clone());
    Ok(month)
  }

  async fn find_day_by_date(&self, jalali_date: &str) -> Result<Option<Day>, Injected> {
    self.check("find_day_by_date")?;
    Ok(self.state().days.iter().find(|d| d.jalali_date == jalali_date).cloned())
  }

  async fn create_day_with_slots(&self, input: NewDay) -> Result<(Day, Vec<Slot>), Injected> {
    self.check("create_day_with_slots")?;
    let mut state = self.state();
    let day = Day {
      id:          state.id(),
      jalali_date: input.jalali_date,
      day_name:    input.day_name,
      month_id:    input.month_id,
    };
    let slots: Vec<Slot> = (0..SLOTS_PER_DAY)
      .map(|hour| Slot { id: state.id(), day_id: day.id, hour })
      .collect();
    state.days.push(day.clone());
    state.slots.extend(slots.iter().cloned());
    Ok((day, slots))
  }

  async fn list_months(&self, filter: &MonthFilter) -> Result<Vec<Month>, Injected> {
    self.check("list_months")?;
    Ok(
      self
        .state()
        .months
        .iter()
        .filter(|m| filter.id.is_none_or(|id| m.id == id))
        .filter(|m| filter.name.as_ref().is_none_or(|n| &m.name == n))
        .cloned()
        .collect(),
    )
  }

  async fn list_days(&self, filter: &DayFilter) -> Result<Vec<Day>, Injected> {
    self.check("list_days")?;
    Ok(
      self
        .state()
        .days
        .iter()
        .filter(|d| filter.id.is_none_or(|id| d.id == id))
        .filter(|d| filter.day_name.as_ref().is_none_or(|n| &d.day_name == n))
        .filter(|d| filter.jalali_date.as_ref().is_none_or(|j| &d.jalali_date == j))
        .cloned()
        .collect(),
    )
  }

  async fn list_slots(&self, filter: &SlotFilter) -> Result<Vec<Slot>, Injected> {
    self.check("list_slots")?;
    Ok(
      self
        .state()
        .slots
        .iter()
        .filter(|s| filter.id.is_none_or(|id| s.id == id))
        .filter(|s| filter.hour.is_none_or(|h| s.hour == h))
        .cloned()
        .collect(),
    )
  }

  async fn days_for_months(&self, month_ids: Vec<MonthId>) -> Result<Vec<Day>, Injected> {
    self.check("days_for_months")?;
    Ok(self.state().days.iter().filter(|d| month_ids.contains(&d.month_id)).cloned().collect())
  }

  async fn slots_for_days(&self, day_ids: Vec<DayId>) -> Result<Vec<Slot>, Injected> {
    self.check("slots_for_days")?;
    Ok(self.state().slots.iter().filter(|s| day_ids.contains(&s.day_id)).cloned().collect())
  }

  async fn notes_for_slots(&self, slot_ids: Vec<SlotId>) -> Result<Vec<Note>, Injected> {
    self.check("notes_for_slots")?;
    Ok(self.state().notes.iter().filter(|n| slot_ids.contains(&n.slot_id)).cloned().collect())
  }

  async fn tags_for_slots(&self, slot_ids: Vec<SlotId>) -> Result<Vec<Tag>, Injected> {
    self.check("tags_for_slots")?;
    Ok(self.state().tags.iter().filter(|t| slot_ids.contains(&t.slot_id)).cloned().collect())
  }

  async fn counts(&self) -> Result<CalendarCounts, Injected> {
    self.check("counts")?;
    let state = self.state();
    let len = |n: usize| n as u64;
    Ok(CalendarCounts {
      months: len(state.months.len()),
      days:   len(state.days.len()),
      slots:  len(state.slots.len()),
      notes:  len(state.notes.len()),
      tags:   len(state.tags.len()),
    })
  }

  async fn upsert_note(&self, slot_id: SlotId, text: Option<String>) -> Result<Option<Note>, Injected> {
    self.check("upsert_note")?;
    let mut state = self.state();
    if !state.has_slot(slot_id) {
      return Ok(None);
    }
    if let Some(note) = state.notes.iter_mut().find(|n| n.slot_id == slot_id) {
      note.text = text;
      return Ok(Some(note.clone()));
    }
    let note = Note { id: state.id(), slot_id, text };
    state.notes.push(note.clone());
    Ok(Some(note))
  }

  async fn replace_tags(&self, slot_id: SlotId, names: Vec<String>) -> Result<Option<Vec<Tag>>, Injected> {
    self.check("replace_tags")?;
    let mut state = self.state();
    if !state.has_slot(slot_id) {
      return Ok(None);
    }
    let existing: Vec<Tag> = state.tags.iter().filter(|t| t.slot_id == slot_id).cloned().collect();
    let plan = reconcile_tags(&existing, &names);
    state.tags.retain(|t| !plan.remove.contains(&t.id));
    for name in plan.add {
      let tag = Tag { id: state.id(), slot_id, name };
      state.tags.push(tag);
    }
    Ok(Some(state.tags.iter().filter(|t| t.slot_id == slot_id).cloned().collect()))
  }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn five_days() -> SeedRange { SeedRange::new(ymd(2025, 3, 21), ymd(2025, 3, 25)).unwrap() }

async fn seeded_slot(store: &Arc<MemoryStore>) -> SlotId {
  let one_day = SeedRange::new(ymd(2025, 3, 21), ymd(2025, 3, 21)).unwrap();
  CalendarSeeder::new(store.clone()).seed(one_day).await.unwrap();
  store.state().slots[0].id
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_failure_names_the_date() {
  let store = Arc::new(MemoryStore::default());
  store.fail_after("create_day_with_slots", 2);

  let err = CalendarSeeder::new(store.clone()).seed(five_days()).await.unwrap_err();
  match err {
    Error::SeedFailed { date, source } => {
      assert_eq!(date, ymd(2025, 3, 23));
      assert_eq!(source.to_string(), "injected failure in create_day_with_slots");
    }
    other => panic!("expected SeedFailed, got {other:?}"),
  }

  let counts = store.counts().await.unwrap();
  assert_eq!((counts.months, counts.days, counts.slots), (1, 2, 48));
}

#[tokio::test]
async fn seeding_resumes_after_a_failure() {
  let store = Arc::new(MemoryStore::default());
  let seeder = CalendarSeeder::new(store.clone());
  store.fail_after("find_day_by_date", 3);
  assert!(seeder.seed(five_days()).await.is_err());

  let report = seeder.seed(five_days()).await.unwrap();
  assert_eq!(report.days_skipped, 3);
  assert_eq!(report.days_created, 2);
  assert_eq!(report.months_created, 0);

  let counts = store.counts().await.unwrap();
  assert_eq!((counts.months, counts.days, counts.slots), (1, 5, 120));
}

#[tokio::test]
async fn month_creation_failure_aborts_before_any_day() {
  let store = Arc::new(MemoryStore::default());
  store.fail_after("create_month", 0);

  let err = CalendarSeeder::new(store.clone()).seed(five_days()).await.unwrap_err();
  assert!(matches!(err, Error::SeedFailed { date, .. } if date == ymd(2025, 3, 21)));
  assert_eq!(store.counts().await.unwrap(), CalendarCounts::default());
}

// ─── Mutations ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn note_failure_is_reported_as_upsert_note() {
  let store = Arc::new(MemoryStore::default());
  let slot_id = seeded_slot(&store).await;
  let m = MutationService::new(store.clone());
  m.upsert_note(slot_id, Some("x".into())).await.unwrap();

  store.fail_after("upsert_note", 0);
  let err = m.upsert_note(slot_id, Some("y".into())).await.unwrap_err();
  assert!(matches!(err, Error::MutationFailed { operation: "upsert_note", .. }));

  let notes = store.notes_for_slots(vec![slot_id]).await.unwrap();
  assert_eq!(notes[0].text.as_deref(), Some("x"));
}

#[tokio::test]
async fn tag_failure_is_reported_as_upsert_tags() {
  let store = Arc::new(MemoryStore::default());
  let slot_id = seeded_slot(&store).await;
  let m = MutationService::new(store.clone());
  let before = m.upsert_tags(slot_id, vec!["a".into(), "b".into()]).await.unwrap();

  store.fail_after("replace_tags", 0);
  let err = m.upsert_tags(slot_id, vec!["c".into()]).await.unwrap_err();
  match err {
    Error::MutationFailed { operation, source } => {
      assert_eq!(operation, "upsert_tags");
      assert_eq!(source.to_string(), "injected failure in replace_tags");
    }
    other => panic!("expected MutationFailed, got {other:?}"),
  }

  assert_eq!(store.tags_for_slots(vec![slot_id]).await.unwrap(), before);
}

#[tokio::test]
async fn missing_slot_is_not_a_storage_failure() {
  let store = Arc::new(MemoryStore::default());
  let err = MutationService::new(store).upsert_note(5, None).await.unwrap_err();
  assert!(matches!(err, Error::SlotNotFound(5)));
}
