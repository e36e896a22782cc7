//! One producer's registry of lenses.
//!
//! Producers allocate lenses by name and update them through the returned
//! handles. The poller attaches through a [`crate::Directory`], rotates the
//! epoch and walks the lenses. Only the poller touches the epoch clock.

use std::ops::ControlFlow;
use std::sync::{Arc, RwLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::epoch::{Epoch, EpochClock, Rotation};
use crate::error::{OpticsError, Result};
use crate::lens::{
    CounterLens, DistLens, GaugeLens, HistoLens, Lens, LensKind, QuantileLens,
};
use crate::registry::Registry;
use crate::{clock_wall, Ts};

#[derive(Debug)]
pub struct Metrics {
    name: String,
    prefix: RwLock<String>,
    source: RwLock<String>,
    clock: EpochClock,
    lenses: DashMap<String, Arc<Lens>>,
}

impl Metrics {
    pub(crate) fn new(name: &str, ts: Ts) -> Self {
        Self {
            name: name.to_string(),
            prefix: RwLock::new(name.to_string()),
            source: RwLock::new(String::new()),
            clock: EpochClock::new(ts),
            lenses: DashMap::new(),
        }
    }

    /// Publish a new instance in `registry`.
    pub fn create(registry: &Registry, name: &str) -> Result<Arc<Self>> {
        registry.create_at(name, clock_wall())
    }

    pub fn create_at(registry: &Registry, name: &str, ts: Ts) -> Result<Arc<Self>> {
        registry.create_at(name, ts)
    }

    /// Withdraw this instance from `registry`.
    pub fn close(&self, registry: &Registry) {
        registry.unlink(&self.name);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> String {
        self.prefix.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn set_prefix(&self, prefix: &str) {
        if let Ok(mut p) = self.prefix.write() {
            *p = prefix.to_string();
        }
    }

    pub fn source(&self) -> String {
        self.source.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn set_source(&self, source: &str) {
        if let Ok(mut s) = self.source.write() {
            *s = source.to_string();
        }
    }

    /// Epoch writers should pass to `update` right now.
    #[inline]
    pub fn epoch(&self) -> Epoch {
        self.clock.current()
    }

    pub fn last_poll(&self) -> Ts {
        self.clock.last_poll()
    }

    /// Close the current measurement window at `ts`.
    pub fn epoch_rotate_at(&self, ts: Ts) -> Rotation {
        self.clock.rotate_at(ts)
    }

    fn lens_alloc(&self, name: &str, kind: LensKind) -> Result<Arc<Lens>> {
        if name.is_empty() {
            return Err(OpticsError::Alloc("lens name must not be empty".into()));
        }
        match self.lenses.entry(name.to_string()) {
            Entry::Occupied(_) => Err(OpticsError::Alloc(format!(
                "lens '{name}' already exists in '{}'",
                self.name
            ))),
            Entry::Vacant(v) => {
                let lens = Arc::new(Lens::new(name, kind));
                v.insert(Arc::clone(&lens));
                Ok(lens)
            }
        }
    }

    pub fn counter_alloc(&self, name: &str) -> Result<Arc<Lens>> {
        self.lens_alloc(name, LensKind::Counter(CounterLens::new()))
    }

    pub fn gauge_alloc(&self, name: &str) -> Result<Arc<Lens>> {
        self.lens_alloc(name, LensKind::Gauge(GaugeLens::new()))
    }

    pub fn dist_alloc(&self, name: &str) -> Result<Arc<Lens>> {
        self.lens_alloc(name, LensKind::Dist(DistLens::new()))
    }

    pub fn histo_alloc(&self, name: &str, edges: &[f64]) -> Result<Arc<Lens>> {
        self.lens_alloc(name, LensKind::Histo(HistoLens::new(edges)?))
    }

    pub fn quantile_alloc(
        &self,
        name: &str,
        target_quantile: f64,
        original_estimate: f64,
        adjustment_value: f64,
    ) -> Result<Arc<Lens>> {
        let q = QuantileLens::new(target_quantile, original_estimate, adjustment_value)?;
        self.lens_alloc(name, LensKind::Quantile(q))
    }

    pub fn lens_get(&self, name: &str) -> Option<Arc<Lens>> {
        self.lenses.get(name).map(|e| Arc::clone(e.value()))
    }

    /// Visit every lens in name order until `visit` breaks.
    pub fn for_each_lens<F>(&self, mut visit: F)
    where
        F: FnMut(&Lens) -> ControlFlow<()>,
    {
        let mut lenses: Vec<Arc<Lens>> = self.lenses.iter().map(|e| Arc::clone(e.value())).collect();
        lenses.sort_by(|a, b| a.name().cmp(b.name()));

        for lens in &lenses {
            if visit(&**lens).is_break() {
                break;
            }
        }
    }
}
