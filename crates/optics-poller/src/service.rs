//! Long-running poller service: periodic cycles, backends, ops endpoint.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::time::{interval, MissedTickBehavior};

use optics_core::{OpticsError, Registry, Result};

use crate::backend::{PrometheusBackend, StdoutBackend};
use crate::config::PollerConfig;
use crate::demo::DemoProducer;
use crate::ops;
use crate::poller::Poller;

/// Run until Ctrl-C, polling `registry` every `poller.interval_ms`.
pub async fn run(cfg: PollerConfig, registry: Arc<Registry>) -> Result<()> {
    let mut poller = Poller::from_config(&cfg.poller, registry.clone());

    if cfg.backends.stdout {
        poller.add_backend(Arc::new(StdoutBackend::new()));
    }

    if let Some(prom_cfg) = &cfg.backends.prometheus {
        let listen = prom_cfg.listen_addr()?;
        let prom = Arc::new(PrometheusBackend::new());
        poller.add_backend(prom.clone());

        let listener = TcpListener::bind(listen)
            .await
            .map_err(|e| OpticsError::Internal(format!("bind {listen} failed: {e}")))?;
        tracing::info!(%listen, "prometheus endpoint listening");

        let app = ops::build_router(prom);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "ops server stopped");
            }
        });
    }

    let demo = if cfg.demo {
        Some(DemoProducer::spawn(registry, poller.host())?)
    } else {
        None
    };

    let poller = Arc::new(poller);
    let mut ticker = interval(cfg.poller.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        host = %poller.host(),
        interval_ms = cfg.poller.interval_ms,
        "optics poller starting"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let p = Arc::clone(&poller);
                match tokio::task::spawn_blocking(move || p.poll()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::warn!(error = %e, "poll cycle failed"),
                    Err(e) => tracing::error!(error = %e, "poll task panicked"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    if let Some(d) = demo {
        // joins the producer thread
        if let Err(e) = tokio::task::spawn_blocking(move || d.stop()).await {
            tracing::error!(error = %e, "demo producer shutdown panicked");
        }
    }
    Ok(())
}
