//! Shared helpers for layer tests: an SDK meter provider exporting into
//! memory, and a flattened read-back of what it aggregated.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::metrics::data::{Histogram, Metric, Sum};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, PeriodicReader, SdkMeterProvider};

/// Meter provider whose reader exports into memory on `force_flush`.
pub struct TestMeter {
    provider: SdkMeterProvider,
    exporter: InMemoryMetricExporter,
    meter: Meter,
}

impl TestMeter {
    pub fn new() -> Self {
        let exporter = InMemoryMetricExporter::default();
        let reader = PeriodicReader::builder(exporter.clone()).build();
        let provider = SdkMeterProvider::builder().with_reader(reader).build();
        let meter = provider.meter("httpmeter-test");
        Self {
            provider,
            exporter,
            meter,
        }
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    /// Cumulative state of every instrument as of now.
    pub fn snapshot(&self) -> Snapshot {
        self.exporter.reset();
        self.provider.force_flush().unwrap();
        let exported = self.exporter.get_finished_metrics().unwrap();

        let mut instruments = Vec::new();
        if let Some(latest) = exported.last() {
            for scope in &latest.scope_metrics {
                instruments.extend(scope.metrics.iter().map(Instrument::from_metric));
            }
        }
        Snapshot { instruments }
    }
}

/// One aggregated series. For the counter, `count` is the counter value.
#[derive(Debug, Clone)]
pub struct Point {
    pub attrs: Vec<KeyValue>,
    pub count: u64,
    pub sum: f64,
    /// Histogram bucket boundaries; empty for the counter.
    pub bounds: Vec<f64>,
}

impl Point {
    pub fn keys(&self) -> Vec<&str> {
        self.attrs.iter().map(|kv| kv.key.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.as_str().into_owned())
    }

    fn matches(&self, labels: &[(&str, &str)]) -> bool {
        labels
            .iter()
            .all(|(k, v)| self.get_str(k).as_deref() == Some(*v))
    }
}

#[derive(Debug, Clone)]
pub struct Instrument {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub points: Vec<Point>,
}

impl Instrument {
    fn from_metric(metric: &Metric) -> Self {
        let data = metric.data.as_any();
        let points = if let Some(sum) = data.downcast_ref::<Sum<u64>>() {
            sum.data_points
                .iter()
                .map(|p| Point {
                    attrs: p.attributes.clone(),
                    count: p.value,
                    sum: p.value as f64,
                    bounds: Vec::new(),
                })
                .collect()
        } else if let Some(hist) = data.downcast_ref::<Histogram<f64>>() {
            hist.data_points
                .iter()
                .map(|p| Point {
                    attrs: p.attributes.clone(),
                    count: p.count,
                    sum: p.sum,
                    bounds: p.bounds.clone(),
                })
                .collect()
        } else {
            panic!("unexpected aggregation for {}", metric.name);
        };

        Self {
            name: metric.name.to_string(),
            description: metric.description.to_string(),
            unit: metric.unit.to_string(),
            points,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub instruments: Vec<Instrument>,
}

impl Snapshot {
    pub fn instrument(&self, name: &str) -> &Instrument {
        self.instruments
            .iter()
            .find(|i| i.name == name)
            .unwrap_or_else(|| panic!("instrument {name} was not exported"))
    }

    pub fn points(&self, name: &str) -> Vec<Point> {
        self.instruments
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.points.clone())
            .unwrap_or_default()
    }

    /// The only series of `name`.
    pub fn single(&self, name: &str) -> Point {
        let points = self.points(name);
        assert_eq!(points.len(), 1, "series of {name}: {points:?}");
        points.into_iter().next().unwrap()
    }

    /// Series of `name` whose attributes include every pair in `labels`.
    pub fn find(&self, name: &str, labels: &[(&str, &str)]) -> Option<Point> {
        self.points(name).into_iter().find(|p| p.matches(labels))
    }

    /// Total measurements across all instruments. One recorded request adds
    /// four: one per instrument.
    pub fn measurements(&self) -> u64 {
        self.instruments
            .iter()
            .flat_map(|i| i.points.iter())
            .map(|p| p.count)
            .sum()
    }
}
