//! The four request instruments.
//!
//! Built once per layer from the injected `opentelemetry` [`Meter`]. The SDK
//! validates instrument names and hands back a no-op instrument (with its own
//! diagnostic) when registration fails, so construction here cannot fail.

use opentelemetry::metrics::{Counter, Histogram, Meter};

pub const REQUESTS_TOTAL: &str = "requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "request_duration_seconds";
pub const REQUEST_SIZE_BYTES: &str = "request_size_bytes";
pub const RESPONSE_SIZE_BYTES: &str = "response_size_bytes";

const KB: f64 = 1024.0;
const MB: f64 = 1024.0 * KB;

/// Bucket boundaries for both size histograms.
pub fn size_buckets() -> Vec<f64> {
    vec![
        KB,
        2.0 * KB,
        5.0 * KB,
        10.0 * KB,
        100.0 * KB,
        500.0 * KB,
        MB,
        2.5 * MB,
        5.0 * MB,
        10.0 * MB,
    ]
}

pub(crate) struct Instruments {
    pub(crate) requests: Counter<u64>,
    pub(crate) duration: Histogram<f64>,
    pub(crate) request_size: Histogram<f64>,
    pub(crate) response_size: Histogram<f64>,
}

impl Instruments {
    /// The duration histogram keeps the SDK's default boundaries.
    pub(crate) fn new(meter: &Meter) -> Self {
        let requests = meter
            .u64_counter(REQUESTS_TOTAL)
            .with_description(
                "How many HTTP requests processed, partitioned by status code and HTTP method.",
            )
            .with_unit("{request}")
            .build();
        let duration = meter
            .f64_histogram(REQUEST_DURATION_SECONDS)
            .with_description("The HTTP request latencies in seconds.")
            .with_unit("s")
            .build();
        let request_size = meter
            .f64_histogram(REQUEST_SIZE_BYTES)
            .with_description("The HTTP request sizes in bytes.")
            .with_unit("By")
            .with_boundaries(size_buckets())
            .build();
        let response_size = meter
            .f64_histogram(RESPONSE_SIZE_BYTES)
            .with_description("The HTTP response sizes in bytes.")
            .with_unit("By")
            .with_boundaries(size_buckets())
            .build();

        Self {
            requests,
            duration,
            request_size,
            response_size,
        }
    }
}
