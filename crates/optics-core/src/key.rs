//! Hierarchical metric key built with stack discipline.
//!
//! The poller pushes `prefix`, `source` and the lens name while descending and
//! pops back to a checkpoint on the way out, reusing one buffer for every lens.

use std::fmt;

/// Segment separator.
pub const KEY_SEP: char = '.';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Key {
    buf: String,
}

impl Key {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment. Returns the checkpoint to hand back to [`Key::pop`].
    /// Empty segments are ignored.
    pub fn push(&mut self, segment: &str) -> usize {
        let checkpoint = self.buf.len();
        if segment.is_empty() {
            return checkpoint;
        }
        if !self.buf.is_empty() {
            self.buf.push(KEY_SEP);
        }
        self.buf.push_str(segment);
        checkpoint
    }

    /// Restore the key to the length it had at `checkpoint`.
    pub fn pop(&mut self, checkpoint: usize) {
        self.buf.truncate(checkpoint.min(self.buf.len()));
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self { buf: s.to_string() }
    }
}
