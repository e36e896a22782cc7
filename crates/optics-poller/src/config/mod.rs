//! Poller config loader (strict parsing).

pub mod schema;

use std::fs;

use optics_core::error::{OpticsError, Result};

pub use schema::{BackendsSection, PollerConfig, PollerSection, PrometheusSection};

pub fn load_from_file(path: &str) -> Result<PollerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| OpticsError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<PollerConfig> {
    let cfg: PollerConfig = serde_yaml::from_str(s)
        .map_err(|e| OpticsError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
