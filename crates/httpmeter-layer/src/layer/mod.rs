//! Request metrics layer.
//!
//! `MetricsConfig` collects the options, `MetricsConfig::into_layer` creates
//! the four instruments on an injected `opentelemetry` [`Meter`] and yields a
//! `tower::Layer`. Every request passing through the resulting service is
//! counted, timed and sized; the inner service's result is returned untouched.

pub mod attributes;
pub mod clock;
pub mod instruments;
pub mod labels;
pub mod route;
pub mod service;
pub mod size;
pub mod status;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use opentelemetry::metrics::Meter;
use tower::Layer;

use httpmeter_core::{MeterError, Result};

use crate::config::MetricsSettings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use labels::{LabelContext, LabelFn, RequestInfo, Skipper};
pub use service::MetricsService;

use instruments::Instruments;

/// Service name used when none (or an empty one) is configured.
pub const DEFAULT_SERVICE_NAME: &str = "http";

/// Options for the metrics layer.
#[derive(Clone)]
pub struct MetricsConfig {
    skipper: Option<Skipper>,
    service_name: String,
    labels: Vec<(String, LabelFn)>,
    clock: Arc<dyn Clock>,
    disable_404_path_fallback: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            skipper: None,
            service_name: String::new(),
            labels: Vec::new(),
            clock: Arc::new(SystemClock),
            disable_404_path_fallback: false,
        }
    }
}

impl fmt::Debug for MetricsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsConfig")
            .field("skipper", &self.skipper.is_some())
            .field("service_name", &self.service_name)
            .field(
                "labels",
                &self.labels.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            )
            .field("disable_404_path_fallback", &self.disable_404_path_fallback)
            .finish()
    }
}

impl MetricsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply file-level settings on top of the defaults.
    pub fn from_settings(settings: &MetricsSettings) -> Self {
        let mut cfg = Self::new()
            .service_name(settings.service_name.clone())
            .disable_404_path_fallback(settings.disable_404_path_fallback);

        if !settings.skip_paths.is_empty() {
            let paths: HashSet<String> = settings.skip_paths.iter().cloned().collect();
            cfg = cfg.skipper(move |req: &RequestInfo<'_>| paths.contains(req.path()));
        }
        cfg
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Bypass instrumentation for requests matching `f`.
    pub fn skipper<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.skipper = Some(Arc::new(f));
        self
    }

    /// Add a custom label. Labels are emitted in the order they were added.
    pub fn label<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&LabelContext<'_>, Option<&(dyn std::error::Error + 'static)>) -> String
            + Send
            + Sync
            + 'static,
    {
        self.labels.push((name.into(), Arc::new(f)));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Keep the route label empty for requests no route matched, instead of
    /// using the raw request path.
    pub fn disable_404_path_fallback(mut self, disable: bool) -> Self {
        self.disable_404_path_fallback = disable;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, _) in &self.labels {
            if name.is_empty() {
                return Err(MeterError::InvalidLabel("label name must not be empty".into()));
            }
            if attributes::BUILTIN.contains(&name.as_str()) {
                return Err(MeterError::InvalidLabel(format!(
                    "label {name} collides with a built-in attribute"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(MeterError::InvalidLabel(format!("duplicate label {name}")));
            }
        }
        Ok(())
    }

    /// Validate, create the instruments on `meter`, and build the layer.
    ///
    /// This is the fallible constructor: a bad label set comes back as
    /// `MeterError::InvalidLabel` instead of a panic. Callers that cannot
    /// run without metrics (the demo binary) treat the error as fatal at
    /// startup.
    pub fn into_layer(self, meter: &Meter) -> Result<MetricsLayer> {
        self.validate()?;
        Ok(MetricsLayer::build(self, meter))
    }
}

pub(crate) struct Shared {
    pub(crate) config: MetricsConfig,
    pub(crate) instruments: Instruments,
}

/// `tower::Layer` producing [`MetricsService`].
#[derive(Clone)]
pub struct MetricsLayer {
    shared: Arc<Shared>,
}

impl MetricsLayer {
    /// Layer with default options and the given service name.
    ///
    /// Cannot fail: no labels are configured, so there is nothing to
    /// validate. Anything with labels goes through
    /// [`MetricsConfig::into_layer`], whose `Result` replaces a panicking
    /// constructor; the demo `main` treats that error as fatal at startup.
    pub fn new(meter: &Meter, service_name: impl Into<String>) -> Self {
        Self::build(MetricsConfig::new().service_name(service_name), meter)
    }

    fn build(mut config: MetricsConfig, meter: &Meter) -> Self {
        if config.service_name.is_empty() {
            config.service_name = DEFAULT_SERVICE_NAME.to_owned();
        }
        let instruments = Instruments::new(meter);
        tracing::debug!(
            service = %config.service_name,
            labels = config.labels.len(),
            skipper = config.skipper.is_some(),
            "metrics layer built"
        );
        Self {
            shared: Arc::new(Shared { config, instruments }),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.shared.config.service_name
    }
}

impl fmt::Debug for MetricsLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsLayer")
            .field("config", &self.shared.config)
            .finish()
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService::new(inner, Arc::clone(&self.shared))
    }
}
