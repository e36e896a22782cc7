//! Epoch rotation for one metrics instance.
//!
//! Writers pick their per-epoch buffer with [`slot`] of the current epoch.
//! The poller bumps the epoch once per cycle, which moves writers onto the
//! other buffer and leaves the retired one for it to read and reset.
//!
//! There is no writer-side handshake: a writer that loaded the epoch just
//! before the bump can still land in the retired buffer. The poller waits a
//! short grace period after rotating and lens reads tolerate the stragglers
//! that still get through.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::Ts;

/// Monotonic counter delimiting measurement windows.
pub type Epoch = u64;

/// Buffer index for a given epoch.
#[inline]
pub fn slot(epoch: Epoch) -> usize {
    (epoch & 1) as usize
}

/// Outcome of one rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    /// Epoch writers use from now on.
    pub epoch: Epoch,
    /// `last_poll` value before this rotation overwrote it.
    pub last_poll: Ts,
}

impl Rotation {
    /// Epoch of the window that was just closed; the one to read.
    pub fn retired(&self) -> Epoch {
        self.epoch.wrapping_sub(1)
    }

    /// Seconds covered by the closed window, measured against `ts`.
    ///
    /// Equal or regressing timestamps yield 1. The second element is true when
    /// the clock went backwards.
    pub fn elapsed(&self, ts: Ts) -> (Ts, bool) {
        if ts > self.last_poll {
            (ts - self.last_poll, false)
        } else if ts == self.last_poll {
            (1, false)
        } else {
            (1, true)
        }
    }
}

/// Epoch counter plus the timestamp of the last rotation.
#[derive(Debug)]
pub struct EpochClock {
    epoch: AtomicU64,
    last_poll: AtomicU64,
}

impl EpochClock {
    pub fn new(ts: Ts) -> Self {
        Self {
            epoch: AtomicU64::new(0),
            last_poll: AtomicU64::new(ts),
        }
    }

    /// Current writer epoch.
    #[inline]
    pub fn current(&self) -> Epoch {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn last_poll(&self) -> Ts {
        self.last_poll.load(Ordering::Acquire)
    }

    /// Close the current window at `ts` and open the next one.
    pub fn rotate_at(&self, ts: Ts) -> Rotation {
        let last_poll = self.last_poll.swap(ts, Ordering::AcqRel);
        let retired = self.epoch.fetch_add(1, Ordering::AcqRel);
        Rotation {
            epoch: retired.wrapping_add(1),
            last_poll,
        }
    }
}
