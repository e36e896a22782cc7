//! Poll cycle orchestration.
//!
//! One cycle: discover and attach instances, rotate every epoch, wait out the
//! grace period once, sweep every lens into the merge table, emit the table to
//! the backends, detach.
//!
//! The grace period is a heuristic. Without writer-side epoch tracking there
//! is no proof that stragglers are done with the retired buffers; lens reads
//! absorb the remainder (`Busy`, or a few writes counted a window late).

pub mod merge;

use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use optics_core::{clock_wall, Directory, Key, Metrics, Result, Rotation, Ts, Visit};

use crate::backend::Backend;
use crate::config::PollerSection;

pub use merge::{MergeTable, SweepCtx};

pub const DEFAULT_MAX_INSTANCES: usize = 128;
pub const DEFAULT_GRACE: Duration = Duration::from_millis(1);

/// What one successful cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub instances: usize,
    pub records: usize,
    /// Lens reads skipped as busy or failed.
    pub skipped: usize,
    pub capacity_reached: bool,
    pub clock_skews: usize,
}

pub struct Poller {
    host: String,
    directory: Arc<dyn Directory>,
    backends: Vec<Arc<dyn Backend>>,
    grace: Duration,
    max_instances: usize,
}

impl Poller {
    pub fn new(host: impl Into<String>, directory: Arc<dyn Directory>) -> Self {
        Self {
            host: host.into(),
            directory,
            backends: Vec::new(),
            grace: DEFAULT_GRACE,
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }

    pub fn from_config(cfg: &PollerSection, directory: Arc<dyn Directory>) -> Self {
        Self::new(cfg.host.clone(), directory)
            .with_grace(cfg.grace())
            .with_max_instances(cfg.max_instances)
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_max_instances(mut self, max: usize) -> Self {
        self.max_instances = max.max(1);
        self
    }

    pub fn add_backend(&mut self, backend: Arc<dyn Backend>) {
        self.backends.push(backend);
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn poll(&self) -> Result<PollStats> {
        self.poll_at(clock_wall())
    }

    /// Run one cycle stamped `ts`. Fails only when discovery fails, in which
    /// case nothing is rotated or emitted.
    pub fn poll_at(&self, ts: Ts) -> Result<PollStats> {
        let mut stats = PollStats::default();

        let attached = self.discover(&mut stats)?;
        if attached.is_empty() {
            return Ok(stats);
        }
        stats.instances = attached.len();

        let rotated: Vec<(Arc<Metrics>, Rotation)> = attached
            .into_iter()
            .map(|m| {
                let rotation = m.epoch_rotate_at(ts);
                (m, rotation)
            })
            .collect();

        if !self.grace.is_zero() {
            thread::sleep(self.grace);
        }

        let mut table = MergeTable::new();
        for (metrics, rotation) in &rotated {
            self.sweep(&mut table, metrics, rotation, ts, &mut stats);
        }

        stats.records = self.dump(&mut table);

        // detach
        drop(rotated);

        tracing::debug!(
            instances = stats.instances,
            records = stats.records,
            skipped = stats.skipped,
            "poll cycle done"
        );
        Ok(stats)
    }

    fn discover(&self, stats: &mut PollStats) -> Result<Vec<Arc<Metrics>>> {
        let mut attached = Vec::new();
        let max = self.max_instances;

        self.directory.for_each(&mut |name| {
            match self.directory.open(name) {
                Ok(m) => attached.push(m),
                Err(e) => {
                    tracing::warn!(name, error = %e, "unable to open metrics instance");
                    return Visit::Continue;
                }
            }

            if attached.len() >= max {
                tracing::warn!(max, "reached metrics polling capacity");
                stats.capacity_reached = true;
                return Visit::Break;
            }
            Visit::Continue
        })?;

        Ok(attached)
    }

    fn sweep(
        &self,
        table: &mut MergeTable,
        metrics: &Metrics,
        rotation: &Rotation,
        ts: Ts,
        stats: &mut PollStats,
    ) {
        let prefix = metrics.prefix();
        let source = metrics.source();

        let (elapsed, skewed) = rotation.elapsed(ts);
        if skewed {
            tracing::warn!(
                prefix = %prefix,
                last_poll = rotation.last_poll,
                poller = ts,
                "clock out of sync"
            );
            stats.clock_skews += 1;
        }

        let ctx = SweepCtx {
            host: &self.host,
            prefix: &prefix,
            source: &source,
            epoch: rotation.retired(),
            ts,
            elapsed,
        };

        let mut key = Key::new();
        key.push(&prefix);
        key.push(&source);

        metrics.for_each_lens(|lens| {
            let old = key.push(lens.name());

            if let Err(e) = table.upsert(&ctx, key.as_str(), lens) {
                if e.is_busy() {
                    tracing::warn!(key = %key, "skipping busy lens");
                } else {
                    tracing::warn!(key = %key, error = %e, "unable to read lens");
                }
                stats.skipped += 1;
            }

            key.pop(old);
            ControlFlow::Continue(())
        });
    }

    fn dump(&self, table: &mut MergeTable) -> usize {
        for b in &self.backends {
            b.begin();
        }

        let mut n = 0;
        for record in table.drain() {
            for b in &self.backends {
                b.record(&record);
            }
            n += 1;
        }

        for b in &self.backends {
            b.done();
        }
        n
    }
}
