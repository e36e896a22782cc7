//! One JSON object per record, newline-delimited.

use std::io::{self, Write};
use std::sync::Mutex;

use optics_core::PollRecord;

use super::Backend;

pub struct StdoutBackend {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Default for StdoutBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutBackend {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(w: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(w)),
        }
    }
}

impl Backend for StdoutBackend {
    fn record(&self, record: &PollRecord) {
        let Ok(mut out) = self.out.lock() else {
            tracing::warn!(key = %record.key, "stdout backend poisoned; dropping record");
            return;
        };

        let res = serde_json::to_writer(&mut *out, record)
            .map_err(io::Error::from)
            .and_then(|_| out.write_all(b"\n"));
        if let Err(e) = res {
            tracing::warn!(key = %record.key, error = %e, "stdout backend write failed");
        }
    }

    fn done(&self) {
        let Ok(mut out) = self.out.lock() else {
            tracing::warn!("stdout backend poisoned; skipping flush");
            return;
        };
        if let Err(e) = out.flush() {
            tracing::warn!(error = %e, "stdout backend flush failed");
        }
    }
}
