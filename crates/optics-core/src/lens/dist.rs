//! Reservoir-sampled distribution.
//!
//! Each epoch slot keeps a count, a max and a uniform reservoir of at most
//! [`DIST_RESERVOIR_LEN`] samples. Slots are guarded by a mutex; writers wait
//! for it, the poller only tries it and reports `Busy` under contention.

use std::sync::{Mutex, TryLockError};

use rand::Rng;
use serde::Serialize;

use crate::epoch::{slot, Epoch};
use crate::error::{OpticsError, Result};
use crate::key::Key;
use crate::poll::{NormalizeFn, PollRecord};

pub const DIST_RESERVOIR_LEN: usize = 200;

/// Snapshot of one closed window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistValue {
    pub n: u64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
}

#[derive(Debug, Default)]
struct DistSlot {
    n: u64,
    max: f64,
    samples: Vec<f64>,
}

impl DistSlot {
    fn record(&mut self, value: f64) {
        self.n += 1;
        if self.n == 1 || value > self.max {
            self.max = value;
        }

        if self.samples.len() < DIST_RESERVOIR_LEN {
            self.samples.push(value);
            return;
        }

        let i = rand::thread_rng().gen_range(0..self.n);
        if let Some(sample) = self.samples.get_mut(i as usize) {
            *sample = value;
        }
    }

    fn take(&mut self) -> DistValue {
        let mut samples = std::mem::take(&mut self.samples);
        samples.sort_by(f64::total_cmp);

        let value = DistValue {
            n: self.n,
            p50: percentile(&samples, 0.50),
            p90: percentile(&samples, 0.90),
            p99: percentile(&samples, 0.99),
            max: self.max,
        };

        samples.clear();
        self.samples = samples;
        self.n = 0;
        self.max = 0.0;
        value
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[idx]
}

#[derive(Debug, Default)]
pub struct DistLens {
    slots: [Mutex<DistSlot>; 2],
}

impl DistLens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, epoch: Epoch, value: f64) -> bool {
        match self.slots[slot(epoch)].lock() {
            Ok(mut s) => {
                s.record(value);
                true
            }
            Err(_) => {
                tracing::warn!("dist slot poisoned; dropping sample");
                false
            }
        }
    }

    /// Drain the slot of `epoch`.
    pub fn read(&self, epoch: Epoch) -> Result<DistValue> {
        match self.slots[slot(epoch)].try_lock() {
            Ok(mut s) => Ok(s.take()),
            Err(TryLockError::WouldBlock) => Err(OpticsError::Busy("dist slot locked".into())),
            Err(TryLockError::Poisoned(_)) => Err(OpticsError::Read("dist slot poisoned".into())),
        }
    }

    /// Hold the `epoch` window's lock until the returned guard drops. Writers
    /// to that window wait and reads of it report `Busy` meanwhile.
    pub fn lock_window(&self, epoch: Epoch) -> impl Sized + '_ {
        match self.slots[slot(epoch)].lock() {
            Ok(g) => g,
            Err(p) => p.into_inner(),
        }
    }
}

pub fn normalize(poll: &PollRecord, value: &DistValue, cb: NormalizeFn<'_>) -> bool {
    let mut key = Key::from(poll.key.as_str());
    let rate = value.n as f64 / poll.elapsed.max(1) as f64;

    let fields = [
        ("count", rate),
        ("p50", value.p50),
        ("p90", value.p90),
        ("p99", value.p99),
        ("max", value.max),
    ];
    for (suffix, v) in fields {
        let old = key.push(suffix);
        let ok = cb(poll.ts, key.as_str(), v);
        key.pop(old);
        if !ok {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn percentiles_and_reset() {
        let d = DistLens::new();
        for v in 1..=100 {
            d.record(0, v as f64);
        }
        let v = d.read(0).unwrap();
        assert_eq!(v.n, 100);
        assert_eq!(v.max, 100.0);
        assert_eq!(v.p50, 51.0);
        assert_eq!(v.p90, 91.0);
        assert_eq!(v.p99, 100.0);

        assert_eq!(d.read(0).unwrap(), DistValue::default());
    }

    #[test]
    fn reservoir_is_bounded() {
        let d = DistLens::new();
        for v in 0..10_000 {
            d.record(3, v as f64);
        }
        assert!(d.slots[slot(3)].lock().unwrap().samples.len() <= DIST_RESERVOIR_LEN);
        let v = d.read(3).unwrap();
        assert_eq!(v.n, 10_000);
        assert_eq!(v.max, 9_999.0);
    }

    #[test]
    fn contended_read_is_busy() {
        let d = DistLens::new();
        d.record(0, 1.0);
        let guard = d.lock_window(0);
        assert!(d.read(0).unwrap_err().is_busy());
        drop(guard);
        assert_eq!(d.read(0).unwrap().n, 1);
    }
}
