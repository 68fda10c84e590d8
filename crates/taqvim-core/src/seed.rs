//! Idempotent population of the calendar for a range of Gregorian dates.
//!
//! Running the seeder any number of times over the same or overlapping
//! ranges converges on the same store contents: months are found by name and
//! days by their Jalali date before anything is created, and a day is always
//! written together with its 24 slots.

use std::sync::Arc;

use chrono::NaiveDate;
use crate::{
  Error, Result,
  calendar::{Month, NewDay, NewMonth},
  jalali::{self, LocalDate},
  store::CalendarStore,
};

// ─── Range ───────────────────────────────────────────────────────────────────

/// An inclusive range of Gregorian dates to seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRange {
  start: NaiveDate,
  end:   NaiveDate,
}

impl SeedRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidSeedRange { start, end });
    }
    Ok(Self { start, end })
  }

  /// The range covering 1 Farvardin through the last day of Esfand.
  pub fn for_jalali_year(year: i32) -> Result<Self> {
    let (start, end) = jalali::year_bounds(year)?;
    Self::new(start, end)
  }

  pub fn start(&self) -> NaiveDate { self.start }

  pub fn end(&self) -> NaiveDate { self.end }

  /// Every date in the range, in increasing order.
  pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
    let end = self.end;
    self.start.iter_days().take_while(move |d| *d <= end)
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// What a single seeding run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub months_created: usize,
  pub days_created:   usize,
  pub slots_created:  usize,
  /// Days that already existed and were left untouched.
  pub days_skipped:   usize,
}

// ─── Seeder ──────────────────────────────────────────────────────────────────

pub struct CalendarSeeder<S> {
  store: Arc<S>,
}

impl<S> CalendarSeeder<S>
where
  S: CalendarStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Ensure every date in `range` has its month, day and 24 slots.
  ///
  /// A storage failure aborts the run with [`Error::SeedFailed`]; days
  /// committed before the failure stay, and a later run picks up from there.
  pub async fn seed(&self, range: SeedRange) -> Result<SeedReport> {
    tracing::info!(start = %range.start, end = %range.end, "seeding calendar");

    let mut report = SeedReport::default();
    for date in range.days() {
      let local = jalali::convert(date)?;
      self
        .seed_day(&local, &mut report)
        .await
        .map_err(|e| Error::SeedFailed { date, source: Box::new(e) })?;
    }

    tracing::info!(
      months_created = report.months_created,
      days_created = report.days_created,
      slots_created = report.slots_created,
      days_skipped = report.days_skipped,
      "calendar seeded"
    );
    Ok(report)
  }

  async fn seed_day(
    &self,
    local: &LocalDate,
    report: &mut SeedReport,
  ) -> Result<(), S::Error> {
    let month = self.resolve_month(local, report).await?;

    if self.store.find_day_by_date(&local.date).await?.is_some() {
      report.days_skipped += 1;
      return Ok(());
    }

    let (day, slots) = self
      .store
      .create_day_with_slots(NewDay {
        jalali_date: local.date.clone(),
        day_name:    local.day_name.clone(),
        month_id:    month.id,
      })
      .await?;

    tracing::debug!(day_id = day.id, date = %day.jalali_date, "created day");
    report.days_created += 1;
    report.slots_created += slots.len();
    Ok(())
  }

  async fn resolve_month(
    &self,
    local: &LocalDate,
    report: &mut SeedReport,
  ) -> Result<Month, S::Error> {
    if let Some(month) = self.store.find_month_by_name(&local.month_name).await? {
      return Ok(month);
    }

    let month = self
      .store
      .create_month(NewMonth { name: local.month_name.clone(), season: local.season })
      .await?;
    tracing::debug!(month_id = month.id, name = %month.name, "created month");
    report.months_created += 1;
    Ok(month)
  }
}
