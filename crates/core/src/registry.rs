// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guarded pattern → listener map shared by all emitter handles

use crate::listener::{Callback, Listener, ListenerId};
use crate::pattern::EventPattern;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// The listener registry.
///
/// One mutex guards the map, held only across map reads and writes. Callbacks
/// are never invoked under the lock, so listeners can re-enter the emitter
/// without deadlocking.
pub(crate) struct Registry {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append a listener under `pattern`, creating the entry if absent.
    pub(crate) fn insert(&self, pattern: &str, callback: Callback, once: bool) -> Listener {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener = Listener::new(id, EventPattern::new(pattern), callback, once);
        let mut map = self.lock();
        map.entry(pattern.to_string())
            .or_default()
            .push(listener.clone());
        listener
    }

    /// Remove the first listener under `pattern` whose id matches, keeping the
    /// relative order of the remainder.
    ///
    /// Leaves the pattern's (possibly empty) entry in place; only
    /// [`Registry::remove_all`] deletes keys.
    pub(crate) fn remove(&self, pattern: &str, id: ListenerId) -> Option<Listener> {
        let mut map = self.lock();
        let entries = map.get_mut(pattern)?;
        let index = entries.iter().position(|listener| listener.id() == id)?;
        Some(entries.remove(index))
    }

    /// Delete one pattern's entry, or the whole map when `pattern` is `None`.
    pub(crate) fn remove_all(&self, pattern: Option<&str>) {
        let mut map = self.lock();
        match pattern {
            None => map.clear(),
            Some(pattern) => {
                map.remove(pattern);
            }
        }
    }

    /// Snapshot every listener whose pattern matches `event_name`.
    ///
    /// Order across patterns follows map iteration and is unspecified; only
    /// the order within a single pattern's entry reflects registration order.
    pub(crate) fn resolve(&self, event_name: &str) -> Vec<Listener> {
        let map = self.lock();
        let mut matched = Vec::new();
        for entries in map.values() {
            // Every entry in a bucket carries the same registration pattern.
            if let Some(first) = entries.first() {
                if first.pattern().matches(event_name) {
                    matched.extend(entries.iter().cloned());
                }
            }
        }
        matched
    }

    /// Currently registered patterns, including ones whose entry is empty.
    pub(crate) fn patterns(&self) -> Vec<EventPattern> {
        self.lock()
            .keys()
            .map(|pattern| EventPattern::new(pattern.as_str()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
