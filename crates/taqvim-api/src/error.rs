//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by the calendar endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The request document could not be decoded, or named values outside
  /// what the calendar can represent.
  #[error("invalid request: {0}")]
  InvalidRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// A query or mutation failed in the store.
  #[error(transparent)]
  Core(taqvim_core::Error),
}

impl ApiError {
  /// Stable machine-readable name for the error class.
  pub fn kind(&self) -> &'static str {
    match self {
      ApiError::InvalidRequest(_) => "invalid_request",
      ApiError::NotFound(_) => "not_found",
      ApiError::Core(_) => "internal",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<taqvim_core::Error> for ApiError {
  fn from(e: taqvim_core::Error) -> Self {
    use taqvim_core::Error as E;
    match e {
      E::SlotNotFound(_) => ApiError::NotFound(e.to_string()),
      E::DateOutOfRange(_) | E::InvalidJalaliDate { .. } | E::InvalidSeedRange { .. } => {
        ApiError::InvalidRequest(e.to_string())
      }
      E::MutationFailed { .. } | E::QueryFailed { .. } | E::SeedFailed { .. } => ApiError::Core(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "calendar request failed");
    } else {
      tracing::warn!(error = %self, "calendar request rejected");
    }

    let body = json!({
      "error": {
        "kind":    self.kind(),
        "message": self.to_string(),
      }
    });
    (status, Json(body)).into_response()
  }
}
