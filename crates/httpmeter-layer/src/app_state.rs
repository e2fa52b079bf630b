//! Shared state for the demo server.

use std::sync::Arc;

use opentelemetry::metrics::Meter;

use httpmeter_core::error::Result;

use crate::config::Settings;
use crate::layer::{MetricsConfig, MetricsLayer};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: Settings,
    layer: MetricsLayer,
}

impl AppState {
    /// Build state and the metrics layer from settings, with instruments on
    /// `meter`. Returns Result so main can report bad label configuration.
    pub fn new(cfg: Settings, meter: &Meter) -> Result<Self> {
        let layer = MetricsConfig::from_settings(&cfg.metrics)
            .label("client", |ctx, _err| {
                ctx.request_headers()
                    .get("x-client")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown")
                    .to_owned()
            })
            .label("outcome", |ctx, err| {
                let outcome = match (err, ctx.status()) {
                    (Some(_), _) => "error",
                    (None, s) if s >= 500 => "server_error",
                    (None, s) if s >= 400 => "client_error",
                    _ => "ok",
                };
                outcome.to_owned()
            })
            .into_layer(meter)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, layer }),
        })
    }

    pub fn cfg(&self) -> &Settings {
        &self.inner.cfg
    }

    pub fn metrics_layer(&self) -> MetricsLayer {
        self.inner.layer.clone()
    }
}
