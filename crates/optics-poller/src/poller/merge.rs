//! Per-cycle table folding lens reads into one record per fully-qualified key.
//!
//! A key seen again later in the same cycle (another instance exporting the
//! same prefix, source and lens name) has its value overwritten by the later
//! read. Values are not summed.

use std::collections::HashMap;

use optics_core::{Epoch, Lens, OpticsError, PollRecord, Ts};

/// Instance-level fields shared by every record of one sweep.
#[derive(Debug, Clone)]
pub struct SweepCtx<'a> {
    pub host: &'a str,
    pub prefix: &'a str,
    pub source: &'a str,
    pub epoch: Epoch,
    pub ts: Ts,
    pub elapsed: Ts,
}

#[derive(Debug, Default)]
pub struct MergeTable {
    records: HashMap<String, PollRecord>,
}

impl MergeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `lens` into the record for `key`, creating it on first sighting.
    /// On error nothing is created or modified.
    pub fn upsert(&mut self, ctx: &SweepCtx<'_>, key: &str, lens: &Lens) -> Result<(), OpticsError> {
        if let Some(record) = self.records.get_mut(key) {
            record.value = lens.read_as(record.lens_type, ctx.epoch)?;
            return Ok(());
        }

        let value = lens.read(ctx.epoch)?;
        self.records.insert(
            key.to_string(),
            PollRecord {
                host: ctx.host.to_string(),
                prefix: ctx.prefix.to_string(),
                source: ctx.source.to_string(),
                key: key.to_string(),
                lens_type: lens.lens_type(),
                ts: ctx.ts,
                elapsed: ctx.elapsed,
                value,
            },
        );
        Ok(())
    }

    /// Hand out every record and leave the table empty.
    pub fn drain(&mut self) -> impl Iterator<Item = PollRecord> + '_ {
        self.records.drain().map(|(_, r)| r)
    }
}
