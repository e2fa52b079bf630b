//! Errors returned by the wrapped handler.
//!
//! The layer never alters a handler error. It only reads two things from it:
//! a structured HTTP status (if any) and an `std::error::Error` view that is
//! handed to label functions.
//!
//! A failure can also arrive without an `Err`: a handler that already wrote
//! its response attaches a [`ResponseError`] to the response extensions, and
//! a request dropped before the handler finished is seen as [`Cancelled`].

use std::convert::Infallible;
use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::error::MeterError;

/// Structured HTTP error carrying the status code a handler failed with.
#[derive(Debug, Clone, Error)]
#[error("http error {code}: {message}")]
pub struct HttpError {
    pub code: u16,
    pub message: String,
}

impl HttpError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failure carried by a response the handler did produce.
///
/// Insert it into the response extensions (for axum, return
/// `Extension(ResponseError::new(..))` as a response part) to have the
/// request recorded as failed while keeping the written status.
#[derive(Debug, Clone)]
pub struct ResponseError(Arc<dyn StdError + Send + Sync>);

impl ResponseError {
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(Arc::from(err.into()))
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }
}

/// The response future was dropped before the handler finished.
#[derive(Debug, Clone, Copy, Default, Error)]
#[error("request cancelled before the handler finished")]
pub struct Cancelled;

/// Error types a metered service may return.
pub trait HandlerError {
    /// Error view passed to label functions.
    fn as_error(&self) -> &(dyn StdError + 'static);

    /// Structured HTTP status carried by this error, if any.
    fn status_code(&self) -> Option<u16> {
        find_http_status(self.as_error())
    }
}

/// Walk the `source()` chain and return the first [`HttpError`] code.
pub fn find_http_status(err: &(dyn StdError + 'static)) -> Option<u16> {
    let mut cur = Some(err);
    while let Some(e) = cur {
        if let Some(http) = e.downcast_ref::<HttpError>() {
            return Some(http.code);
        }
        cur = e.source();
    }
    None
}

impl HandlerError for Infallible {
    fn as_error(&self) -> &(dyn StdError + 'static) {
        match *self {}
    }
}

impl HandlerError for HttpError {
    fn as_error(&self) -> &(dyn StdError + 'static) {
        self
    }

    fn status_code(&self) -> Option<u16> {
        Some(self.code)
    }
}

impl HandlerError for MeterError {
    fn as_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

impl HandlerError for ResponseError {
    fn as_error(&self) -> &(dyn StdError + 'static) {
        &*self.0
    }
}

impl HandlerError for Cancelled {
    fn as_error(&self) -> &(dyn StdError + 'static) {
        self
    }
}

/// Matches `tower::BoxError`.
impl HandlerError for Box<dyn StdError + Send + Sync> {
    fn as_error(&self) -> &(dyn StdError + 'static) {
        &**self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("wrapped")]
    struct Wrapped(#[source] HttpError);

    #[test]
    fn status_found_through_source_chain() {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(Wrapped(HttpError::new(404, "nope")));
        assert_eq!(boxed.status_code(), Some(404));
    }

    #[test]
    fn response_error_exposes_wrapped_chain() {
        let e = ResponseError::new(Wrapped(HttpError::new(503, "busy")));
        assert_eq!(e.status_code(), Some(503));
        assert_eq!(e.as_error().to_string(), "wrapped");
    }

    #[test]
    fn cancelled_has_no_status() {
        assert_eq!(Cancelled.status_code(), None);
    }

    #[test]
    fn plain_error_has_no_status() {
        let boxed: Box<dyn StdError + Send + Sync> = "boom".into();
        assert_eq!(boxed.status_code(), None);
    }
}
