//! In-process producer used by `demo: true`.
//!
//! Publishes one instance with one lens of every kind and feeds it synthetic
//! request latencies until stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;

use optics_core::{Metrics, Registry, Result};

pub const DEMO_INSTANCE: &str = "optics-demo";

pub struct DemoProducer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    metrics: Arc<Metrics>,
    registry: Arc<Registry>,
}

impl DemoProducer {
    pub fn spawn(registry: Arc<Registry>, source: &str) -> Result<Self> {
        let metrics = Metrics::create(&registry, DEMO_INSTANCE)?;
        metrics.set_source(source);

        let requests = metrics.counter_alloc("requests")?;
        let inflight = metrics.gauge_alloc("inflight")?;
        let latency = metrics.dist_alloc("latency")?;
        let buckets = metrics.histo_alloc("latency_ms", &[0.0, 5.0, 10.0, 25.0, 50.0, 100.0])?;
        let p90 = metrics.quantile_alloc("latency_p90", 0.9, 10.0, 0.05)?;

        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = Arc::clone(&stop);
            let metrics = Arc::clone(&metrics);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                while !stop.load(Ordering::Relaxed) {
                    let epoch = metrics.epoch();
                    let ms: f64 = rng.gen_range(1.0..20.0f64) * rng.gen_range(1.0..4.0f64);

                    requests.update(epoch, 1.0);
                    inflight.update(epoch, rng.gen_range(0.0..32.0f64).floor());
                    latency.update(epoch, ms);
                    buckets.update(epoch, ms);
                    p90.update(epoch, ms);

                    thread::sleep(Duration::from_micros(500));
                }
            })
        };

        tracing::info!(instance = DEMO_INSTANCE, source, "demo producer started");
        Ok(Self {
            stop,
            handle: Some(handle),
            metrics,
            registry,
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
        self.metrics.close(&self.registry);
    }
}

impl Drop for DemoProducer {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}
