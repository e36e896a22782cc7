//! Fixed-bucket histogram.
//!
//! `edges` are strictly increasing; bucket `i` counts values in
//! `[edges[i], edges[i + 1])`. Values outside the edges land in `below` or
//! `above`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::epoch::{slot, Epoch};
use crate::error::{OpticsError, Result};
use crate::key::Key;
use crate::poll::{NormalizeFn, PollRecord};

pub const HISTO_MIN_EDGES: usize = 2;
pub const HISTO_MAX_EDGES: usize = 32;

/// Snapshot of one closed window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoValue {
    pub edges: Vec<f64>,
    pub below: u64,
    pub above: u64,
    pub counts: Vec<u64>,
}

#[derive(Debug)]
struct HistoSlot {
    below: AtomicU64,
    above: AtomicU64,
    counts: Box<[AtomicU64]>,
}

impl HistoSlot {
    fn new(buckets: usize) -> Self {
        Self {
            below: AtomicU64::new(0),
            above: AtomicU64::new(0),
            counts: (0..buckets).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

#[derive(Debug)]
pub struct HistoLens {
    edges: Vec<f64>,
    slots: [HistoSlot; 2],
}

impl HistoLens {
    pub fn new(edges: &[f64]) -> Result<Self> {
        if !(HISTO_MIN_EDGES..=HISTO_MAX_EDGES).contains(&edges.len()) {
            return Err(OpticsError::Alloc(format!(
                "histo needs {HISTO_MIN_EDGES}..={HISTO_MAX_EDGES} edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(OpticsError::Alloc(
                "histo edges must be finite and strictly increasing".into(),
            ));
        }

        let buckets = edges.len() - 1;
        Ok(Self {
            edges: edges.to_vec(),
            slots: [HistoSlot::new(buckets), HistoSlot::new(buckets)],
        })
    }

    pub fn inc(&self, epoch: Epoch, value: f64) {
        let s = &self.slots[slot(epoch)];
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];

        if value < first {
            s.below.fetch_add(1, Ordering::Relaxed);
        } else if value >= last || value.is_nan() {
            s.above.fetch_add(1, Ordering::Relaxed);
        } else {
            let i = self.edges.partition_point(|e| *e <= value).saturating_sub(1);
            if let Some(c) = s.counts.get(i) {
                c.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Drain the slot of `epoch`.
    pub fn read(&self, epoch: Epoch) -> HistoValue {
        let s = &self.slots[slot(epoch)];
        HistoValue {
            edges: self.edges.clone(),
            below: s.below.swap(0, Ordering::Relaxed),
            above: s.above.swap(0, Ordering::Relaxed),
            counts: s.counts.iter().map(|c| c.swap(0, Ordering::Relaxed)).collect(),
        }
    }
}

pub fn normalize(poll: &PollRecord, value: &HistoValue, cb: NormalizeFn<'_>) -> bool {
    let mut key = Key::from(poll.key.as_str());
    let elapsed = poll.elapsed.max(1) as f64;

    let mut emit = |key: &mut Key, suffix: &str, n: u64| {
        let old = key.push(suffix);
        let ok = cb(poll.ts, key.as_str(), n as f64 / elapsed);
        key.pop(old);
        ok
    };

    if !emit(&mut key, "below", value.below) {
        return false;
    }
    if !emit(&mut key, "above", value.above) {
        return false;
    }
    for (i, n) in value.counts.iter().enumerate() {
        let (Some(lo), Some(hi)) = (value.edges.get(i), value.edges.get(i + 1)) else {
            break;
        };
        if !emit(&mut key, &format!("bucket_{lo}_{hi}"), *n) {
            return false;
        }
    }
    true
}
