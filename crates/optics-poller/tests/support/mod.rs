//! Shared fixtures: capturing backend and a scripted directory.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use optics_core::{Directory, Metrics, OpticsError, PollRecord, Result, Visit};
use optics_poller::backend::Backend;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Begin,
    Record(PollRecord),
    Done,
}

#[derive(Default)]
pub struct Capture {
    events: Mutex<Vec<Event>>,
}

impl Capture {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<PollRecord> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Record(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn record(&self, key: &str) -> PollRecord {
        self.records()
            .into_iter()
            .find(|r| r.key == key)
            .unwrap_or_else(|| panic!("no record for {key}"))
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Backend for Capture {
    fn begin(&self) {
        self.events.lock().unwrap().push(Event::Begin);
    }

    fn record(&self, record: &PollRecord) {
        self.events.lock().unwrap().push(Event::Record(record.clone()));
    }

    fn done(&self) {
        self.events.lock().unwrap().push(Event::Done);
    }
}

/// Directory that lists instances in a fixed order, or fails to enumerate.
pub struct Scripted {
    pub instances: Vec<Arc<Metrics>>,
    pub fail: bool,
}

impl Directory for Scripted {
    fn for_each(&self, visit: &mut dyn FnMut(&str) -> Visit) -> Result<()> {
        if self.fail {
            return Err(OpticsError::Directory("enumeration failed".into()));
        }
        for m in &self.instances {
            if visit(m.name()) == Visit::Break {
                break;
            }
        }
        Ok(())
    }

    fn open(&self, name: &str) -> Result<Arc<Metrics>> {
        self.instances
            .iter()
            .find(|m| m.name() == name)
            .cloned()
            .ok_or_else(|| OpticsError::Directory(format!("no instance named '{name}'")))
    }
}
