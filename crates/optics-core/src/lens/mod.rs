//! Lens kinds and the closed [`Lens`] wrapper the registry stores.
//!
//! Every kind answers the same three questions: `update` (producer side),
//! `read` (poller side, for the retired epoch) and `normalize` (turning a
//! read value into scalar `(ts, key, value)` points). Dispatch is a `match` on
//! [`LensKind`]; the set of kinds is fixed.

pub mod counter;
pub mod dist;
pub mod gauge;
pub mod histo;
pub mod quantile;

use std::fmt;

use serde::Serialize;

use crate::epoch::Epoch;
use crate::error::{OpticsError, Result};

pub use counter::CounterLens;
pub use dist::{DistLens, DistValue};
pub use gauge::GaugeLens;
pub use histo::{HistoLens, HistoValue};
pub use quantile::QuantileLens;

/// Type tag reported by every lens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LensType {
    Counter,
    Gauge,
    Dist,
    Histo,
    Quantile,
}

impl LensType {
    pub fn as_str(self) -> &'static str {
        match self {
            LensType::Counter => "counter",
            LensType::Gauge => "gauge",
            LensType::Dist => "dist",
            LensType::Histo => "histo",
            LensType::Quantile => "quantile",
        }
    }
}

impl fmt::Display for LensType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value read from one lens for one closed window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LensValue {
    Counter(i64),
    Gauge(f64),
    Dist(DistValue),
    Histo(HistoValue),
    Quantile(f64),
}

impl LensValue {
    pub fn lens_type(&self) -> LensType {
        match self {
            LensValue::Counter(_) => LensType::Counter,
            LensValue::Gauge(_) => LensType::Gauge,
            LensValue::Dist(_) => LensType::Dist,
            LensValue::Histo(_) => LensType::Histo,
            LensValue::Quantile(_) => LensType::Quantile,
        }
    }
}

#[derive(Debug)]
pub enum LensKind {
    Counter(CounterLens),
    Gauge(GaugeLens),
    Dist(DistLens),
    Histo(HistoLens),
    Quantile(QuantileLens),
}

/// Named metric cell owned by a [`crate::Metrics`] instance.
#[derive(Debug)]
pub struct Lens {
    name: String,
    kind: LensKind,
}

impl Lens {
    pub fn new(name: impl Into<String>, kind: LensKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lens_type(&self) -> LensType {
        match &self.kind {
            LensKind::Counter(_) => LensType::Counter,
            LensKind::Gauge(_) => LensType::Gauge,
            LensKind::Dist(_) => LensType::Dist,
            LensKind::Histo(_) => LensType::Histo,
            LensKind::Quantile(_) => LensType::Quantile,
        }
    }

    /// Record one observation. Counters add `value` truncated to an integer.
    pub fn update(&self, epoch: Epoch, value: f64) -> bool {
        match &self.kind {
            LensKind::Counter(c) => {
                c.inc(epoch, value as i64);
                true
            }
            LensKind::Gauge(g) => {
                g.set(value);
                true
            }
            LensKind::Dist(d) => d.record(epoch, value),
            LensKind::Histo(h) => {
                h.inc(epoch, value);
                true
            }
            LensKind::Quantile(q) => q.update(value),
        }
    }

    /// Read the window of `epoch`. Epoch-agnostic kinds ignore it.
    pub fn read(&self, epoch: Epoch) -> Result<LensValue> {
        match &self.kind {
            LensKind::Counter(c) => Ok(LensValue::Counter(c.read(epoch))),
            LensKind::Gauge(g) => Ok(LensValue::Gauge(g.read())),
            LensKind::Dist(d) => d.read(epoch).map(LensValue::Dist),
            LensKind::Histo(h) => Ok(LensValue::Histo(h.read(epoch))),
            LensKind::Quantile(q) => Ok(LensValue::Quantile(q.read())),
        }
    }

    /// Like [`Lens::read`] but fails unless the lens is of type `expected`.
    pub fn read_as(&self, expected: LensType, epoch: Epoch) -> Result<LensValue> {
        let actual = self.lens_type();
        if actual != expected {
            return Err(OpticsError::Read(format!(
                "lens '{}' is a {actual}, expected {expected}",
                self.name
            )));
        }
        self.read(epoch)
    }

    pub fn as_dist(&self) -> Option<&DistLens> {
        match &self.kind {
            LensKind::Dist(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_quantile(&self) -> Option<&QuantileLens> {
        match &self.kind {
            LensKind::Quantile(q) => Some(q),
            _ => None,
        }
    }
}
