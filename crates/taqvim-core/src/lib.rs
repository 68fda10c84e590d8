//! Core types and services for the Taqvim scheduling calendar.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend is reached only through [`store::CalendarStore`], which is
//! handed to each service at construction.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod error;
pub mod jalali;
pub mod mutation;
pub mod query;
pub mod seed;
pub mod store;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
