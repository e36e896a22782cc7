//! Metrics instance, lens allocation, epoch slots and registry directory.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::ops::ControlFlow;

use optics_core::{Directory, Key, LensType, LensValue, Registry, Visit};

#[test]
fn duplicate_names_fail() {
    let registry = Registry::new();
    let m = registry.create_at("proc", 0).unwrap();
    m.counter_alloc("hits").unwrap();

    let err = m.gauge_alloc("hits").unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert!(registry.create_at("proc", 0).is_err());
}

#[test]
fn counter_reads_retired_epoch_only() {
    let registry = Registry::new();
    let m = registry.create_at("proc", 0).unwrap();
    let hits = m.counter_alloc("hits").unwrap();

    hits.update(m.epoch(), 3.0);
    hits.update(m.epoch(), 4.0);

    let rot = m.epoch_rotate_at(10);
    hits.update(m.epoch(), 100.0);

    assert_eq!(hits.read(rot.retired()).unwrap(), LensValue::Counter(7));
    assert_eq!(hits.read(rot.retired()).unwrap(), LensValue::Counter(0));

    let rot = m.epoch_rotate_at(20);
    assert_eq!(rot.last_poll, 10);
    assert_eq!(hits.read(rot.retired()).unwrap(), LensValue::Counter(100));
}

#[test]
fn gauge_survives_rotation() {
    let registry = Registry::new();
    let m = registry.create_at("proc", 0).unwrap();
    let g = m.gauge_alloc("temp").unwrap();

    g.update(m.epoch(), 21.5);
    let rot = m.epoch_rotate_at(1);
    assert_eq!(g.read(rot.retired()).unwrap(), LensValue::Gauge(21.5));
    assert_eq!(g.read(rot.epoch).unwrap(), LensValue::Gauge(21.5));
}

#[test]
fn lens_get_returns_the_allocated_lens() {
    let registry = Registry::new();
    let m = registry.create_at("proc", 0).unwrap();
    let hits = m.counter_alloc("hits").unwrap();

    let found = m.lens_get("hits").unwrap();
    assert_eq!(found.name(), "hits");
    assert_eq!(found.lens_type(), LensType::Counter);

    found.update(m.epoch(), 2.0);
    assert_eq!(hits.read(m.epoch()).unwrap(), LensValue::Counter(2));
    assert!(m.lens_get("missing").is_none());
}

#[test]
fn read_as_rejects_mismatched_type() {
    let registry = Registry::new();
    let m = registry.create_at("proc", 0).unwrap();
    let g = m.gauge_alloc("temp").unwrap();

    let err = g.read_as(LensType::Counter, 0).unwrap_err();
    assert!(!err.is_busy());
    assert!(g.read_as(LensType::Gauge, 0).is_ok());
}

#[test]
fn lenses_visited_in_name_order() {
    let registry = Registry::new();
    let m = registry.create_at("proc", 0).unwrap();
    m.counter_alloc("b").unwrap();
    m.gauge_alloc("a").unwrap();
    m.histo_alloc("c", &[0.0, 1.0]).unwrap();

    let mut seen = Vec::new();
    m.for_each_lens(|lens| {
        seen.push(lens.name().to_string());
        ControlFlow::Continue(())
    });
    assert_eq!(seen, ["a", "b", "c"]);

    let mut first = None;
    m.for_each_lens(|lens| {
        first = Some(lens.name().to_string());
        ControlFlow::Break(())
    });
    assert_eq!(first.as_deref(), Some("a"));
}

#[test]
fn registry_enumerates_and_unlinks() {
    let registry = Registry::new();
    let a = registry.create_at("a", 0).unwrap();
    registry.create_at("b", 0).unwrap();
    registry.create_at("c", 0).unwrap();

    let mut names = Vec::new();
    registry
        .for_each(&mut |name| {
            names.push(name.to_string());
            if names.len() == 2 { Visit::Break } else { Visit::Continue }
        })
        .unwrap();
    assert_eq!(names, ["a", "b"]);

    let attached = registry.open("a").unwrap();
    a.close(&registry);
    assert!(registry.open("a").is_err());
    assert_eq!(attached.name(), "a");
    assert_eq!(registry.len(), 2);
}

#[test]
fn prefix_defaults_to_name() {
    let registry = Registry::new();
    let m = registry.create_at("proc", 0).unwrap();
    assert_eq!(m.prefix(), "proc");
    assert_eq!(m.source(), "");

    m.set_prefix("svc");
    m.set_source("web-1");
    assert_eq!(m.prefix(), "svc");
    assert_eq!(m.source(), "web-1");
}

#[test]
fn key_push_pop() {
    let mut key = Key::new();
    key.push("svc");
    let host = key.push("web-1");
    assert_eq!(key.as_str(), "svc.web-1");

    let lens = key.push("latency");
    assert_eq!(key.to_string(), "svc.web-1.latency");
    key.pop(lens);
    assert_eq!(key.as_str(), "svc.web-1");

    key.push("");
    assert_eq!(key.as_str(), "svc.web-1");
    key.pop(host);
    assert_eq!(key.as_str(), "svc");
}
