//! httpmeter core: error types shared by the layer crate and the view the
//! layer takes of handler failures.
//!
//! This crate carries no HTTP, runtime or metrics dependencies. It defines
//! the shared error surface and [`HandlerError`], the trait a wrapped
//! service's error type implements so the layer can find a structured HTTP
//! status and hand an `std::error::Error` view to label functions.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Recording is best-effort and must never take down a request path.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod handler_error;

/// Shared result type.
pub use error::{MeterError, Result};
pub use handler_error::{Cancelled, HandlerError, HttpError, ResponseError};
