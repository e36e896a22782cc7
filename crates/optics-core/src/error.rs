//! Shared error type across optics crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, OpticsError>;

/// Unified error type used by core and poller.
#[derive(Debug, Error)]
pub enum OpticsError {
    /// Lens or instance allocation refused (duplicate name, bad parameters).
    #[error("alloc failed: {0}")]
    Alloc(String),
    /// Lens is transiently contended; skip it for this cycle.
    #[error("lens busy: {0}")]
    Busy(String),
    /// Lens could not be read.
    #[error("read failed: {0}")]
    Read(String),
    /// Instance directory could not be enumerated or opened.
    #[error("directory: {0}")]
    Directory(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl OpticsError {
    /// Transient contention that should be retried next cycle rather than reported.
    pub fn is_busy(&self) -> bool {
        matches!(self, OpticsError::Busy(_))
    }
}
