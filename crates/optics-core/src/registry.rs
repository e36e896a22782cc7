//! Directory of published metrics instances.
//!
//! The poller only sees instances through [`Directory`], so it can be driven
//! by the in-process [`Registry`] or by a test fixture.

use std::sync::{Arc, OnceLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{OpticsError, Result};
use crate::metrics::Metrics;
use crate::Ts;

/// Enumeration control returned by a directory visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Stop enumerating; what was visited so far stands.
    Break,
}

pub trait Directory: Send + Sync {
    /// Call `visit` with the name of every published instance. Fails only when
    /// the directory itself cannot be enumerated.
    fn for_each(&self, visit: &mut dyn FnMut(&str) -> Visit) -> Result<()>;

    /// Attach to a published instance. The returned handle is detached by
    /// dropping it.
    fn open(&self, name: &str) -> Result<Arc<Metrics>>;
}

/// In-process instance registry keyed by name.
#[derive(Debug, Default)]
pub struct Registry {
    instances: DashMap<String, Arc<Metrics>>,
}

static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> Arc<Registry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Registry::new())))
    }

    /// Publish a new instance stamped with `ts` as its initial `last_poll`.
    /// Fails if the name is already taken.
    pub fn create_at(&self, name: &str, ts: Ts) -> Result<Arc<Metrics>> {
        if name.is_empty() {
            return Err(OpticsError::Alloc("instance name must not be empty".into()));
        }
        match self.instances.entry(name.to_string()) {
            Entry::Occupied(_) => Err(OpticsError::Alloc(format!(
                "instance '{name}' already exists"
            ))),
            Entry::Vacant(v) => {
                let metrics = Arc::new(Metrics::new(name, ts));
                v.insert(Arc::clone(&metrics));
                tracing::debug!(name, "metrics instance published");
                Ok(metrics)
            }
        }
    }

    /// Withdraw an instance. Attached handles stay valid until dropped.
    pub fn unlink(&self, name: &str) -> Option<Arc<Metrics>> {
        let removed = self.instances.remove(name).map(|(_, m)| m);
        if removed.is_some() {
            tracing::debug!(name, "metrics instance unlinked");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Directory for Registry {
    fn for_each(&self, visit: &mut dyn FnMut(&str) -> Visit) -> Result<()> {
        let mut names: Vec<String> = self.instances.iter().map(|e| e.key().clone()).collect();
        names.sort();

        for name in &names {
            if visit(name.as_str()) == Visit::Break {
                break;
            }
        }
        Ok(())
    }

    fn open(&self, name: &str) -> Result<Arc<Metrics>> {
        self.instances
            .get(name)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| OpticsError::Directory(format!("no instance named '{name}'")))
    }
}
