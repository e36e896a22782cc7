//! optics poller library entry.
//!
//! This crate wires discovery, epoch rotation, the merge table and the
//! recording backends into a poll cycle, plus the config loader and the
//! long-running service used by the binary (`main.rs`) and integration tests.

pub mod backend;
pub mod config;
pub mod demo;
pub mod ops;
pub mod poller;
pub mod service;

pub use poller::{PollStats, Poller};
