//! Top-level facade crate for httpmeter.
//!
//! Re-exports core types and the layer library so users can depend on a single crate.

pub mod core {
    pub use httpmeter_core::*;
}

pub mod layer {
    pub use httpmeter_layer::*;
}

pub use httpmeter_layer::{MetricsConfig, MetricsLayer};
