//! Calendar entities and the nested read models built from them.
//!
//! Entities reference their owner by id only; there are no back-references.
//! The nested views (`MonthView` → `DayView` → `SlotView`) are assembled on
//! read by [`crate::query::QueryService`] and are never stored.

use serde::{Deserialize, Serialize};

use crate::jalali::Season;

pub type MonthId = i64;
pub type DayId = i64;
pub type SlotId = i64;
pub type NoteId = i64;
pub type TagId = i64;

/// Number of hourly slots every day carries.
pub const SLOTS_PER_DAY: u8 = 24;

// ─── Entities ────────────────────────────────────────────────────────────────

/// One of the twelve local months. Created during seeding, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Month {
  pub id:     MonthId,
  /// Localized month name; unique across the store.
  pub name:   String,
  pub season: Season,
}

/// A single local-calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
  pub id:          DayId,
  /// Zero-padded `YYYY-MM-DD` Jalali date; the natural key of a day.
  pub jalali_date: String,
  /// Localized weekday name.
  pub day_name:    String,
  pub month_id:    MonthId,
}

/// One hour of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
  pub id:     SlotId,
  pub day_id: DayId,
  /// `0..=23`; unique within a day.
  pub hour:   u8,
}

/// Free-text annotation on a slot. A slot carries at most one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
  pub id:      NoteId,
  pub slot_id: SlotId,
  pub text:    Option<String>,
}

/// A label on a slot. Names are unique within one slot only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
  pub id:      TagId,
  pub slot_id: SlotId,
  pub name:    String,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::CalendarStore::create_month`].
#[derive(Debug, Clone)]
pub struct NewMonth {
  pub name:   String,
  pub season: Season,
}

/// Input to [`crate::store::CalendarStore::create_day_with_slots`].
#[derive(Debug, Clone)]
pub struct NewDay {
  pub jalali_date: String,
  pub day_name:    String,
  pub month_id:    MonthId,
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Exact-match filters for months; all given fields must match.
#[derive(Debug, Clone, Default)]
pub struct MonthFilter {
  pub id:   Option<MonthId>,
  pub name: Option<String>,
}

/// Exact-match filters for days; all given fields must match.
#[derive(Debug, Clone, Default)]
pub struct DayFilter {
  pub id:          Option<DayId>,
  pub day_name:    Option<String>,
  pub jalali_date: Option<String>,
}

/// Exact-match filters for slots; all given fields must match.
#[derive(Debug, Clone, Default)]
pub struct SlotFilter {
  pub id:   Option<SlotId>,
  pub hour: Option<u8>,
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
  pub id:     SlotId,
  pub day_id: DayId,
  pub hour:   u8,
  pub note:   Option<Note>,
  pub tags:   Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
  pub id:          DayId,
  pub jalali_date: String,
  pub day_name:    String,
  pub month_id:    MonthId,
  pub slots:       Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthView {
  pub id:     MonthId,
  pub name:   String,
  pub season: Season,
  pub days:   Vec<DayView>,
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Row counts per entity, as reported by
/// [`crate::store::CalendarStore::counts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarCounts {
  pub months: u64,
  pub days:   u64,
  pub slots:  u64,
  pub notes:  u64,
  pub tags:   u64,
}
