//! JSON API for the Taqvim calendar.
//!
//! Exposes an axum [`Router`] with a single `POST /calendar` endpoint backed
//! by any [`taqvim_core::store::CalendarStore`]. CORS, tracing and static
//! hosting are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(taqvim_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod request;

use std::sync::Arc;

use axum::{Router, routing::post};
use taqvim_core::{mutation::MutationService, query::QueryService, store::CalendarStore};

pub use error::ApiError;
pub use request::{CalendarData, CalendarRequest};

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the calendar handler.
pub struct ApiState<S> {
  pub queries:   QueryService<S>,
  pub mutations: MutationService<S>,
}

impl<S> ApiState<S>
where
  S: CalendarStore,
{
  pub fn new(store: Arc<S>) -> Self {
    Self {
      queries:   QueryService::new(Arc::clone(&store)),
      mutations: MutationService::new(store),
    }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { queries: self.queries.clone(), mutations: self.mutations.clone() }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CalendarStore + 'static,
{
  Router::new()
    .route("/calendar", post(request::handler::<S>))
    .with_state(ApiState::new(store))
}
