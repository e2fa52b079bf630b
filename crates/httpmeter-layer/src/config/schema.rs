//! Settings file schema.
//!
//! Every struct denies unknown fields; `Settings::validate` runs after
//! parsing and rejects values serde cannot.

use serde::Deserialize;
use httpmeter_core::error::{MeterError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub metrics: MetricsSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeterError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.listen.trim().is_empty() {
            return Err(MeterError::Config("server.listen must not be empty".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// File-level options of the metrics layer. Code-only options (label
/// functions, custom skip predicates, clock) are set on `MetricsConfig`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSettings {
    /// Empty means the built-in default.
    #[serde(default)]
    pub service_name: String,

    #[serde(default)]
    pub disable_404_path_fallback: bool,

    /// Exact request paths that bypass instrumentation.
    #[serde(default)]
    pub skip_paths: Vec<String>,
}

impl MetricsSettings {
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.skip_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(MeterError::Config(format!(
                "metrics.skip_paths entry {bad:?} must start with '/'"
            )));
        }
        Ok(())
    }
}
