//! Error type for `taqvim-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("unknown season in months table: {0:?}")]
  UnknownSeason(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
