//! Last-value gauge. Epoch-agnostic: reads never reset it.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::poll::{NormalizeFn, PollRecord};

#[derive(Debug)]
pub struct GaugeLens {
    bits: AtomicU64,
}

impl Default for GaugeLens {
    fn default() -> Self {
        Self::new()
    }
}

impl GaugeLens {
    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn read(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

pub fn normalize(poll: &PollRecord, value: f64, cb: NormalizeFn<'_>) -> bool {
    cb(poll.ts, &poll.key, value)
}
