//! Error types for `taqvim-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::SlotId;

/// A boxed storage-layer error, as carried by the failure variants below.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("date {0} is outside the supported conversion range")]
  DateOutOfRange(NaiveDate),

  #[error("invalid jalali date {year:04}-{month:02}-{day:02}")]
  InvalidJalaliDate { year: i32, month: u32, day: u32 },

  #[error("invalid seed range: {start} is after {end}")]
  InvalidSeedRange { start: NaiveDate, end: NaiveDate },

  #[error("slot not found: {0}")]
  SlotNotFound(SlotId),

  #[error("{operation} failed: {source}")]
  MutationFailed {
    operation: &'static str,
    #[source]
    source:    BoxedSource,
  },

  #[error("{query} query failed: {source}")]
  QueryFailed {
    query:  &'static str,
    #[source]
    source: BoxedSource,
  },

  #[error("seeding failed at {date}: {source}")]
  SeedFailed {
    date:   NaiveDate,
    #[source]
    source: BoxedSource,
  },
}

impl Error {
  pub(crate) fn mutation<E>(operation: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::MutationFailed { operation, source: Box::new(source) }
  }

  pub(crate) fn query<E>(query: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::QueryFailed { query, source: Box::new(source) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
