//! Recording sinks for finished poll cycles.
//!
//! Per cycle the poller calls `begin`, then `record` once per merged record,
//! then `done`. Cycles never interleave.

pub mod prometheus;
pub mod stdout;

use optics_core::PollRecord;

pub use prometheus::PrometheusBackend;
pub use stdout::StdoutBackend;

pub trait Backend: Send + Sync {
    fn begin(&self) {}
    fn record(&self, record: &PollRecord);
    fn done(&self) {}
}
