//! Stdout and Prometheus backends fed by real poll cycles.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use optics_core::Registry;
use optics_poller::backend::{PrometheusBackend, StdoutBackend};
use optics_poller::Poller;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn fixture() -> Arc<Registry> {
    let registry = Arc::new(Registry::new());
    let m = registry.create_at("proc", 0).unwrap();
    m.set_prefix("svc");
    m.set_source("web");

    let hits = m.counter_alloc("hits").unwrap();
    hits.update(m.epoch(), 10.0);

    let lat = m.dist_alloc("lat").unwrap();
    for v in 1..=10 {
        lat.update(m.epoch(), v as f64);
    }

    let sizes = m.histo_alloc("size", &[0.0, 10.0, 100.0]).unwrap();
    sizes.update(m.epoch(), 5.0);
    sizes.update(m.epoch(), 50.0);
    sizes.update(m.epoch(), 500.0);

    m.quantile_alloc("median", 0.5, 4.0, 0.25).unwrap();
    registry
}

#[test]
fn stdout_writes_json_lines() {
    let buf = SharedBuf::default();
    let mut p = Poller::new("h", fixture()).with_grace(Duration::ZERO);
    p.add_backend(Arc::new(StdoutBackend::with_writer(buf.clone())));
    p.poll_at(5).unwrap();

    let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);

    let q = lines.iter().find(|v| v["key"] == "svc.web.median").unwrap();
    assert_eq!(q["type"], "quantile");
    assert_eq!(q["value"], 4.0);
    assert_eq!(q["host"], "h");
    assert_eq!(q["elapsed"], 5);

    let d = lines.iter().find(|v| v["key"] == "svc.web.lat").unwrap();
    assert_eq!(d["type"], "dist");
    assert_eq!(d["value"]["n"], 10);
    assert_eq!(d["value"]["max"], 10.0);
}

#[test]
fn prometheus_publishes_normalized_page() {
    let prom = Arc::new(PrometheusBackend::new());
    let mut p = Poller::new("h", fixture()).with_grace(Duration::ZERO);
    p.add_backend(prom.clone());

    assert!(prom.render().is_empty());
    p.poll_at(5).unwrap();
    let page = prom.render();

    // counter and dist count are rates over elapsed = 5s
    assert!(page.contains("svc_web_hits{host=\"h\",source=\"web\"} 2 5000"), "{page}");
    assert!(page.contains("svc_web_lat_count{host=\"h\",source=\"web\"} 2 5000"), "{page}");
    assert!(page.contains("svc_web_lat_max{host=\"h\",source=\"web\"} 10 5000"), "{page}");
    assert!(page.contains("svc_web_lat_p50{host=\"h\",source=\"web\"} 6 5000"), "{page}");
    assert!(page.contains("svc_web_median{host=\"h\",source=\"web\"} 4 5000"), "{page}");
    assert!(page.contains("svc_web_size_above{host=\"h\",source=\"web\"} 0.2 5000"), "{page}");
    assert!(page.contains("svc_web_size_bucket_10_100{host=\"h\",source=\"web\"} 0.2 5000"), "{page}");
}

#[test]
fn prometheus_spells_infinite_values() {
    let registry = Arc::new(Registry::new());
    let m = registry.create_at("p", 0).unwrap();
    m.gauge_alloc("up").unwrap().update(m.epoch(), f64::INFINITY);
    m.gauge_alloc("down").unwrap().update(m.epoch(), f64::NEG_INFINITY);

    let prom = Arc::new(PrometheusBackend::new());
    let mut p = Poller::new("h", registry).with_grace(Duration::ZERO);
    p.add_backend(prom.clone());
    p.poll_at(5).unwrap();

    let page = prom.render();
    assert!(page.contains("p_up{host=\"h\",source=\"\"} +Inf 5000"), "{page}");
    assert!(page.contains("p_down{host=\"h\",source=\"\"} -Inf 5000"), "{page}");
    assert!(!page.contains(" inf "), "{page}");
}

struct FailingFlush(SharedBuf);

impl Write for FailingFlush {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn stdout_survives_flush_failure() {
    let buf = SharedBuf::default();
    let mut p = Poller::new("h", fixture()).with_grace(Duration::ZERO);
    p.add_backend(Arc::new(StdoutBackend::with_writer(FailingFlush(buf.clone()))));

    p.poll_at(5).unwrap();
    p.poll_at(6).unwrap();

    let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    assert_eq!(out.lines().count(), 8);
}
