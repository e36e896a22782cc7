//! Top-level facade crate for optics.
//!
//! Re-exports the lens/registry core and the poller so users can depend on a single crate.

pub mod core {
    pub use optics_core::*;
}

pub mod poller {
    pub use optics_poller::*;
}
