//! Encoding and decoding helpers between domain types and SQLite rows.
//!
//! Seasons are stored as their Persian names so the table reads the same as
//! the API output. Every other column maps onto a primitive directly.

use rusqlite::Row;
use taqvim_core::{
  calendar::{Day, Month, Note, Slot, Tag},
  jalali::Season,
};

use crate::{Error, Result};

// ─── Season ──────────────────────────────────────────────────────────────────

pub fn encode_season(s: Season) -> &'static str { s.local_name() }

pub fn decode_season(s: &str) -> Result<Season> {
  Season::from_local_name(s).ok_or_else(|| Error::UnknownSeason(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `months` row before the season column is decoded.
pub struct RawMonth {
  pub id:     i64,
  pub name:   String,
  pub season: String,
}

impl RawMonth {
  pub const COLUMNS: &'static str = "id, name, season";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:     row.get(0)?,
      name:   row.get(1)?,
      season: row.get(2)?,
    })
  }

  pub fn into_month(self) -> Result<Month> {
    Ok(Month {
      id:     self.id,
      name:   self.name,
      season: decode_season(&self.season)?,
    })
  }
}

pub const DAY_COLUMNS: &str = "id, jalali_date, day_name, month_id";

pub fn day_from_row(row: &Row<'_>) -> rusqlite::Result<Day> {
  Ok(Day {
    id:          row.get(0)?,
    jalali_date: row.get(1)?,
    day_name:    row.get(2)?,
    month_id:    row.get(3)?,
  })
}

pub const SLOT_COLUMNS: &str = "id, day_id, hour";

pub fn slot_from_row(row: &Row<'_>) -> rusqlite::Result<Slot> {
  Ok(Slot {
    id:     row.get(0)?,
    day_id: row.get(1)?,
    hour:   row.get(2)?,
  })
}

pub const NOTE_COLUMNS: &str = "id, slot_id, text";

pub fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
  Ok(Note {
    id:      row.get(0)?,
    slot_id: row.get(1)?,
    text:    row.get(2)?,
  })
}

pub const TAG_COLUMNS: &str = "id, slot_id, name";

pub fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
  Ok(Tag {
    id:      row.get(0)?,
    slot_id: row.get(1)?,
    name:    row.get(2)?,
  })
}

// ─── IN lists ────────────────────────────────────────────────────────────────

/// `?, ?, ?` with `n` placeholders.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }
