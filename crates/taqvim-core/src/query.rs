//! Read side: nested month → day → slot → note/tag views.
//!
//! Each query fetches the filtered top-level rows, then loads every nested
//! level with a single find-by-owner lookup and stitches the results together
//! in memory. An empty match is an empty `Vec`, never an error.

use std::{collections::HashMap, sync::Arc};

use crate::{
  Error, Result,
  calendar::{
    Day, DayFilter, DayView, MonthFilter, MonthView, Note, Slot, SlotFilter,
    SlotId, SlotView, Tag,
  },
  store::CalendarStore,
};

pub struct QueryService<S> {
  store: Arc<S>,
}

impl<S> Clone for QueryService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> QueryService<S>
where
  S: CalendarStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Months matching `filter`, each with its days, slots, notes and tags.
  pub async fn months(&self, filter: &MonthFilter) -> Result<Vec<MonthView>> {
    let months = self
      .store
      .list_months(filter)
      .await
      .map_err(|e| Error::query("months", e))?;
    if months.is_empty() {
      return Ok(Vec::new());
    }

    let days = self
      .store
      .days_for_months(months.iter().map(|m| m.id).collect())
      .await
      .map_err(|e| Error::query("months", e))?;
    let mut days_by_month: HashMap<_, Vec<DayView>> = HashMap::new();
    for day in self.day_views(days, "months").await? {
      days_by_month.entry(day.month_id).or_default().push(day);
    }

    Ok(
      months
        .into_iter()
        .map(|m| MonthView {
          days:   days_by_month.remove(&m.id).unwrap_or_default(),
          id:     m.id,
          name:   m.name,
          season: m.season,
        })
        .collect(),
    )
  }

  /// Days matching `filter`, each with its slots, notes and tags.
  pub async fn days(&self, filter: &DayFilter) -> Result<Vec<DayView>> {
    let days = self
      .store
      .list_days(filter)
      .await
      .map_err(|e| Error::query("days", e))?;
    self.day_views(days, "days").await
  }

  /// Slots matching `filter`, each with its note and tags.
  pub async fn slots(&self, filter: &SlotFilter) -> Result<Vec<SlotView>> {
    let slots = self
      .store
      .list_slots(filter)
      .await
      .map_err(|e| Error::query("slots", e))?;
    self.slot_views(slots, "slots").await
  }

  /// The notes owned by `slot_id`: zero or one.
  pub async fn notes(&self, slot_id: SlotId) -> Result<Vec<Note>> {
    self
      .store
      .notes_for_slots(vec![slot_id])
      .await
      .map_err(|e| Error::query("notes", e))
  }

  async fn day_views(&self, days: Vec<Day>, query: &'static str) -> Result<Vec<DayView>> {
    if days.is_empty() {
      return Ok(Vec::new());
    }

    let slots = self
      .store
      .slots_for_days(days.iter().map(|d| d.id).collect())
      .await
      .map_err(|e| Error::query(query, e))?;
    let mut slots_by_day: HashMap<_, Vec<SlotView>> = HashMap::new();
    for slot in self.slot_views(slots, query).await? {
      slots_by_day.entry(slot.day_id).or_default().push(slot);
    }

    Ok(
      days
        .into_iter()
        .map(|d| DayView {
          slots:       slots_by_day.remove(&d.id).unwrap_or_default(),
          id:          d.id,
          jalali_date: d.jalali_date,
          day_name:    d.day_name,
          month_id:    d.month_id,
        })
        .collect(),
    )
  }

  async fn slot_views(&self, slots: Vec<Slot>, query: &'static str) -> Result<Vec<SlotView>> {
    if slots.is_empty() {
      return Ok(Vec::new());
    }

    let ids: Vec<SlotId> = slots.iter().map(|s| s.id).collect();
    let notes = self
      .store
      .notes_for_slots(ids.clone())
      .await
      .map_err(|e| Error::query(query, e))?;
    let tags = self
      .store
      .tags_for_slots(ids)
      .await
      .map_err(|e| Error::query(query, e))?;

    let mut note_by_slot: HashMap<SlotId, Note> =
      notes.into_iter().map(|n| (n.slot_id, n)).collect();
    let mut tags_by_slot: HashMap<SlotId, Vec<Tag>> = HashMap::new();
    for tag in tags {
      tags_by_slot.entry(tag.slot_id).or_default().push(tag);
    }

    Ok(
      slots
        .into_iter()
        .map(|s| SlotView {
          note:   note_by_slot.remove(&s.id),
          tags:   tags_by_slot.remove(&s.id).unwrap_or_default(),
          id:     s.id,
          day_id: s.day_id,
          hour:   s.hour,
        })
        .collect(),
    )
  }
}
