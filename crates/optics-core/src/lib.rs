//! optics core: lock-free metric cells ("lenses") and the instance registry
//! they live in.
//!
//! Producers allocate lenses inside a [`Metrics`] instance and update them from
//! any number of threads without locking. A poller attaches to every published
//! instance, rotates its epoch, and reads each lens back as a [`LensValue`].
//! This crate carries no runtime or transport dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Lens reads surface
//! contention and failures as [`OpticsError`] so a poll never brings down the
//! instrumented process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod epoch;
pub mod error;
pub mod key;
pub mod lens;
pub mod metrics;
pub mod poll;
pub mod registry;

/// Shared result type.
pub use error::{OpticsError, Result};

pub use epoch::{Epoch, Rotation};
pub use key::Key;
pub use lens::{Lens, LensKind, LensType, LensValue};
pub use metrics::Metrics;
pub use poll::PollRecord;
pub use registry::{Directory, Registry, Visit};

/// Wall-clock timestamp in seconds, the unit of `ts`, `last_poll` and `elapsed`.
pub type Ts = u64;

/// Current wall-clock time in seconds since the Unix epoch.
pub fn clock_wall() -> Ts {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
