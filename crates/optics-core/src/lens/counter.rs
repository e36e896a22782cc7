//! Per-epoch accumulating counter, reported as a rate.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::epoch::{slot, Epoch};
use crate::poll::{NormalizeFn, PollRecord};

#[derive(Debug, Default)]
pub struct CounterLens {
    slots: [AtomicI64; 2],
}

impl CounterLens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, epoch: Epoch, n: i64) {
        self.slots[slot(epoch)].fetch_add(n, Ordering::Relaxed);
    }

    /// Drain the slot of `epoch`.
    pub fn read(&self, epoch: Epoch) -> i64 {
        self.slots[slot(epoch)].swap(0, Ordering::Relaxed)
    }
}

pub fn normalize(poll: &PollRecord, value: i64, cb: NormalizeFn<'_>) -> bool {
    let rate = value as f64 / poll.elapsed.max(1) as f64;
    cb(poll.ts, &poll.key, rate)
}
