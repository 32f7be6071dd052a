//! Immutable in-memory event snapshot.

use std::path::Path;

use chrono::{DateTime, Utc};
use usage_core::error::Result;
use usage_core::models::UsageEvent;

use crate::reader;

/// All events loaded at startup, in file-then-row order.
///
/// Nothing mutates the events after construction, so a store can be shared
/// between concurrent readers behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct EventStore {
    events: Vec<UsageEvent>,
    loaded_at: DateTime<Utc>,
}

impl EventStore {
    /// Load the standard source files from `data_path`.
    pub fn load(data_path: &Path) -> Result<Self> {
        let loaded_at = Utc::now();
        let events = reader::load_events_from(data_path, reader::SOURCE_FILES, loaded_at)?;
        Ok(Self { events, loaded_at })
    }

    /// Wrap an already-parsed event list.
    pub fn from_events(events: Vec<UsageEvent>) -> Self {
        Self {
            events,
            loaded_at: Utc::now(),
        }
    }

    /// A store with no events; queries fall back to demo data.
    pub fn empty() -> Self {
        Self::from_events(Vec::new())
    }

    pub fn events(&self) -> &[UsageEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// When the snapshot was built.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::empty()
    }
}
