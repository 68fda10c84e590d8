//! [`SqliteStore`]: the SQLite implementation of [`CalendarStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use taqvim_core::{
  calendar::{
    CalendarCounts, Day, DayFilter, DayId, Month, MonthFilter, MonthId, NewDay,
    NewMonth, Note, SLOTS_PER_DAY, Slot, SlotFilter, SlotId, Tag,
  },
  mutation::reconcile_tags,
  store::CalendarStore,
};

use crate::{
  Result,
  encode::{
    DAY_COLUMNS, NOTE_COLUMNS, RawMonth, SLOT_COLUMNS, TAG_COLUMNS, day_from_row,
    encode_season, note_from_row, placeholders, slot_from_row, tag_from_row,
  },
  schema::SCHEMA,
};

/// Upper bound on ids bound into one `IN (...)` list.
const MAX_IDS_PER_STATEMENT: usize = 500;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A calendar store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. All calls
/// run one at a time on the connection's thread, and every multi-row write
/// runs inside its own transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("schema initialised");
    Ok(())
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run raw SQL against the connection; used to install failing triggers.
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Run `template` (with `{ids}` standing in for the IN list) once per chunk of
/// `ids` and return every row, ordered by `key`.
fn select_by_owner<T>(
  conn: &rusqlite::Connection,
  template: &str,
  ids: &[i64],
  map: impl Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
  key: impl Fn(&T) -> i64,
) -> rusqlite::Result<Vec<T>> {
  let mut out = Vec::new();
  for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
    let sql = template.replace("{ids}", &placeholders(chunk.len()));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(chunk), &map)?;
    for row in rows {
      out.push(row?);
    }
  }
  out.sort_by_key(|item| key(item));
  Ok(out)
}

fn slot_exists(conn: &rusqlite::Connection, slot_id: SlotId) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM slots WHERE id = ?1",
        rusqlite::params![slot_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn tags_of_slot(conn: &rusqlite::Connection, slot_id: SlotId) -> rusqlite::Result<Vec<Tag>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {TAG_COLUMNS} FROM tags WHERE slot_id = ?1 ORDER BY id"
  ))?;
  let tags = stmt
    .query_map(rusqlite::params![slot_id], tag_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(tags)
}

// ─── CalendarStore impl ──────────────────────────────────────────────────────

impl CalendarStore for SqliteStore {
  type Error = crate::Error;

  // ── Seeding ───────────────────────────────────────────────────────────────

  async fn find_month_by_name(&self, name: &str) -> Result<Option<Month>> {
    let name = name.to_owned();

    let raw: Option<RawMonth> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM months WHERE name = ?1", RawMonth::COLUMNS),
              rusqlite::params![name],
              RawMonth::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMonth::into_month).transpose()
  }

  async fn create_month(&self, input: NewMonth) -> Result<Month> {
    let name = input.name.clone();
    let season = encode_season(input.season);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO months (name, season) VALUES (?1, ?2)",
          rusqlite::params![name, season],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Month { id, name: input.name, season: input.season })
  }

  async fn find_day_by_date(&self, jalali_date: &str) -> Result<Option<Day>> {
    let jalali_date = jalali_date.to_owned();

    let day = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DAY_COLUMNS} FROM days WHERE jalali_date = ?1"),
              rusqlite::params![jalali_date],
              day_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(day)
  }

  async fn create_day_with_slots(&self, input: NewDay) -> Result<(Day, Vec<Slot>)> {
    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO days (jalali_date, day_name, month_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![input.jalali_date, input.day_name, input.month_id],
        )?;
        let day = Day {
          id:          tx.last_insert_rowid(),
          jalali_date: input.jalali_date,
          day_name:    input.day_name,
          month_id:    input.month_id,
        };

        let mut slots = Vec::with_capacity(usize::from(SLOTS_PER_DAY));
        {
          let mut stmt = tx.prepare("INSERT INTO slots (day_id, hour) VALUES (?1, ?2)")?;
          for hour in 0..SLOTS_PER_DAY {
            stmt.execute(rusqlite::params![day.id, hour])?;
            slots.push(Slot { id: tx.last_insert_rowid(), day_id: day.id, hour });
          }
        }

        tx.commit()?;
        Ok((day, slots))
      })
      .await?;

    Ok(created)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_months(&self, filter: &MonthFilter) -> Result<Vec<Month>> {
    let id = filter.id;
    let name = filter.name.clone();

    let raws: Vec<RawMonth> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM months
           WHERE (?1 IS NULL OR id = ?1)
             AND (?2 IS NULL OR name = ?2)
           ORDER BY id",
          RawMonth::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id, name], RawMonth::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMonth::into_month).collect()
  }

  async fn list_days(&self, filter: &DayFilter) -> Result<Vec<Day>> {
    let id = filter.id;
    let day_name = filter.day_name.clone();
    let jalali_date = filter.jalali_date.clone();

    let days = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DAY_COLUMNS} FROM days
           WHERE (?1 IS NULL OR id = ?1)
             AND (?2 IS NULL OR day_name = ?2)
             AND (?3 IS NULL OR jalali_date = ?3)
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id, day_name, jalali_date], day_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(days)
  }

  async fn list_slots(&self, filter: &SlotFilter) -> Result<Vec<Slot>> {
    let id = filter.id;
    let hour = filter.hour;

    let slots = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SLOT_COLUMNS} FROM slots
           WHERE (?1 IS NULL OR id = ?1)
             AND (?2 IS NULL OR hour = ?2)
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id, hour], slot_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(slots)
  }

  async fn days_for_months(&self, month_ids: Vec<MonthId>) -> Result<Vec<Day>> {
    let days = self
      .conn
      .call(move |conn| {
        Ok(select_by_owner(
          conn,
          &format!("SELECT {DAY_COLUMNS} FROM days WHERE month_id IN ({{ids}})"),
          &month_ids,
          day_from_row,
          |d| d.id,
        )?)
      })
      .await?;

    Ok(days)
  }

  async fn slots_for_days(&self, day_ids: Vec<DayId>) -> Result<Vec<Slot>> {
    let slots = self
      .conn
      .call(move |conn| {
        Ok(select_by_owner(
          conn,
          &format!("SELECT {SLOT_COLUMNS} FROM slots WHERE day_id IN ({{ids}})"),
          &day_ids,
          slot_from_row,
          |s| s.id,
        )?)
      })
      .await?;

    Ok(slots)
  }

  async fn notes_for_slots(&self, slot_ids: Vec<SlotId>) -> Result<Vec<Note>> {
    let notes = self
      .conn
      .call(move |conn| {
        Ok(select_by_owner(
          conn,
          &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE slot_id IN ({{ids}})"),
          &slot_ids,
          note_from_row,
          |n| n.id,
        )?)
      })
      .await?;

    Ok(notes)
  }

  async fn tags_for_slots(&self, slot_ids: Vec<SlotId>) -> Result<Vec<Tag>> {
    let tags = self
      .conn
      .call(move |conn| {
        Ok(select_by_owner(
          conn,
          &format!("SELECT {TAG_COLUMNS} FROM tags WHERE slot_id IN ({{ids}})"),
          &slot_ids,
          tag_from_row,
          |t| t.id,
        )?)
      })
      .await?;

    Ok(tags)
  }

  async fn counts(&self) -> Result<CalendarCounts> {
    let counts = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM months),
             (SELECT COUNT(*) FROM days),
             (SELECT COUNT(*) FROM slots),
             (SELECT COUNT(*) FROM notes),
             (SELECT COUNT(*) FROM tags)",
          [],
          |row| {
            Ok(CalendarCounts {
              months: row.get(0)?,
              days:   row.get(1)?,
              slots:  row.get(2)?,
              notes:  row.get(3)?,
              tags:   row.get(4)?,
            })
          },
        )?)
      })
      .await?;

    Ok(counts)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_note(&self, slot_id: SlotId, text: Option<String>) -> Result<Option<Note>> {
    let note = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !slot_exists(&tx, slot_id)? {
          return Ok(None);
        }

        let existing: Option<i64> = tx
          .query_row(
            "SELECT id FROM notes WHERE slot_id = ?1",
            rusqlite::params![slot_id],
            |r| r.get(0),
          )
          .optional()?;

        let id = match existing {
          Some(id) => {
            tx.execute(
              "UPDATE notes SET text = ?2 WHERE id = ?1",
              rusqlite::params![id, text],
            )?;
            id
          }
          None => {
            tx.execute(
              "INSERT INTO notes (slot_id, text) VALUES (?1, ?2)",
              rusqlite::params![slot_id, text],
            )?;
            tx.last_insert_rowid()
          }
        };

        tx.commit()?;
        Ok(Some(Note { id, slot_id, text }))
      })
      .await?;

    Ok(note)
  }

  async fn replace_tags(&self, slot_id: SlotId, names: Vec<String>) -> Result<Option<Vec<Tag>>> {
    let tags = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !slot_exists(&tx, slot_id)? {
          return Ok(None);
        }

        let existing = tags_of_slot(&tx, slot_id)?;
        let plan = reconcile_tags(&existing, &names);
        if plan.is_noop() {
          return Ok(Some(existing));
        }

        for id in &plan.remove {
          tx.execute("DELETE FROM tags WHERE id = ?1", rusqlite::params![id])?;
        }
        for name in &plan.add {
          tx.execute(
            "INSERT INTO tags (slot_id, name) VALUES (?1, ?2)",
            rusqlite::params![slot_id, name],
          )?;
        }

        let tags = tags_of_slot(&tx, slot_id)?;
        tx.commit()?;
        Ok(Some(tags))
      })
      .await?;

    Ok(tags)
  }
}
