//! httpmeter layer library entry.
//!
//! This crate provides the request metrics `tower` layer, recording through
//! an injected `opentelemetry` meter, and the settings loader. It is consumed
//! by the demo binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod layer;
pub mod router;

pub use layer::{MetricsConfig, MetricsLayer, MetricsService, DEFAULT_SERVICE_NAME};
