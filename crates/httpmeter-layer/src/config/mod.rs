//! Settings loader (strict parsing).

pub mod schema;

use std::fs;

use httpmeter_core::error::{MeterError, Result};

pub use schema::{MetricsSettings, ServerSettings, Settings};

pub fn load_from_file(path: &str) -> Result<Settings> {
    let s = fs::read_to_string(path)
        .map_err(|e| MeterError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<Settings> {
    let cfg: Settings = serde_yaml::from_str(s)
        .map_err(|e| MeterError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
