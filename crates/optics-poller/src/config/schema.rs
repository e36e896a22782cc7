use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use optics_core::error::{OpticsError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollerConfig {
    pub version: u32,

    #[serde(default)]
    pub poller: PollerSection,

    #[serde(default)]
    pub backends: BackendsSection,

    /// Spawn an in-process producer so there is something to poll.
    #[serde(default)]
    pub demo: bool,
}

impl PollerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(OpticsError::UnsupportedVersion);
        }

        self.poller.validate()?;
        self.backends.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,

    #[serde(default = "default_max_instances")]
    pub max_instances: usize,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            interval_ms: default_interval_ms(),
            grace_ms: default_grace_ms(),
            max_instances: default_max_instances(),
        }
    }
}

impl PollerSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(OpticsError::Config("poller.host must not be empty".into()));
        }
        if !(1000..=3_600_000).contains(&self.interval_ms) {
            return Err(OpticsError::Config(
                "poller.interval_ms must be between 1000 and 3600000".into(),
            ));
        }
        if self.grace_ms > 1000 {
            return Err(OpticsError::Config(
                "poller.grace_ms must be at most 1000".into(),
            ));
        }
        if !(1..=4096).contains(&self.max_instances) {
            return Err(OpticsError::Config(
                "poller.max_instances must be between 1 and 4096".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

fn default_host() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".into())
}
fn default_interval_ms() -> u64 {
    10_000
}
fn default_grace_ms() -> u64 {
    1
}
fn default_max_instances() -> usize {
    128
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BackendsSection {
    /// JSON line per record on stdout.
    #[serde(default)]
    pub stdout: bool,

    #[serde(default)]
    pub prometheus: Option<PrometheusSection>,
}

impl BackendsSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(p) = &self.prometheus {
            p.listen_addr()?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl PrometheusSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            OpticsError::Config(format!("backends.prometheus.listen is not a socket address: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:9110".into()
}
