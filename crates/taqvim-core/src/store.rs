//! The `CalendarStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `taqvim-store-sqlite`).
//! The seeder and the query/mutation services depend on this abstraction, not
//! on any concrete backend. Every listing is ordered by id ascending.

use std::future::Future;

use crate::calendar::{
  CalendarCounts, Day, DayFilter, DayId, Month, MonthFilter, MonthId, NewDay,
  NewMonth, Note, Slot, SlotFilter, SlotId, Tag,
};

/// Abstraction over a calendar storage backend.
///
/// Each method is one unit of work against the backend: the multi-row writes
/// (`create_day_with_slots`, `upsert_note`, `replace_tags`) either commit in
/// full or leave the store untouched.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CalendarStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Seeding ───────────────────────────────────────────────────────────

  fn find_month_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Month>, Self::Error>> + Send + 'a;

  /// Persist a new month. Fails if the name is already taken.
  fn create_month(
    &self,
    input: NewMonth,
  ) -> impl Future<Output = Result<Month, Self::Error>> + Send + '_;

  fn find_day_by_date<'a>(
    &'a self,
    jalali_date: &'a str,
  ) -> impl Future<Output = Result<Option<Day>, Self::Error>> + Send + 'a;

  /// Persist a day together with its 24 hourly slots in one transaction.
  /// Fails if the date is already taken.
  fn create_day_with_slots(
    &self,
    input: NewDay,
  ) -> impl Future<Output = Result<(Day, Vec<Slot>), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn list_months<'a>(
    &'a self,
    filter: &'a MonthFilter,
  ) -> impl Future<Output = Result<Vec<Month>, Self::Error>> + Send + 'a;

  fn list_days<'a>(
    &'a self,
    filter: &'a DayFilter,
  ) -> impl Future<Output = Result<Vec<Day>, Self::Error>> + Send + 'a;

  fn list_slots<'a>(
    &'a self,
    filter: &'a SlotFilter,
  ) -> impl Future<Output = Result<Vec<Slot>, Self::Error>> + Send + 'a;

  /// All days owned by any of `month_ids`.
  fn days_for_months(
    &self,
    month_ids: Vec<MonthId>,
  ) -> impl Future<Output = Result<Vec<Day>, Self::Error>> + Send + '_;

  /// All slots owned by any of `day_ids`.
  fn slots_for_days(
    &self,
    day_ids: Vec<DayId>,
  ) -> impl Future<Output = Result<Vec<Slot>, Self::Error>> + Send + '_;

  /// All notes owned by any of `slot_ids`.
  fn notes_for_slots(
    &self,
    slot_ids: Vec<SlotId>,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;

  /// All tags owned by any of `slot_ids`.
  fn tags_for_slots(
    &self,
    slot_ids: Vec<SlotId>,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  fn counts(&self) -> impl Future<Output = Result<CalendarCounts, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Overwrite the slot's note, or create it if the slot has none.
  ///
  /// Returns `None` if the slot does not exist.
  fn upsert_note(
    &self,
    slot_id: SlotId,
    text: Option<String>,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;

  /// Reconcile the slot's tags to exactly `names` (see
  /// [`crate::mutation::reconcile_tags`]) and return the resulting set.
  ///
  /// Returns `None` if the slot does not exist.
  fn replace_tags(
    &self,
    slot_id: SlotId,
    names: Vec<String>,
  ) -> impl Future<Output = Result<Option<Vec<Tag>>, Self::Error>> + Send + '_;
}
