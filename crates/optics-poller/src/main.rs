//! optics poller
//!
//! - Polls every published metrics instance on a fixed interval
//! - Emits merged records to stdout (JSON lines) and/or a Prometheus page
//! - `/healthz`, `/metrics` when the prometheus backend is enabled

use tracing_subscriber::{fmt, EnvFilter};

use optics_core::Registry;
use optics_poller::{config, service};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "optics.yaml".into());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, error = %e, "config load failed");
            std::process::exit(2);
        }
    };

    if let Err(e) = service::run(cfg, Registry::global()).await {
        tracing::error!(error = %e, "poller failed");
        std::process::exit(1);
    }
}
