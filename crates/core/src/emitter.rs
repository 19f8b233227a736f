// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Emitter: registration and dispatch surface over the listener registry

use crate::listener::{arg, Arg, Callback, Listener, ListenerId};
use crate::pattern::EventPattern;
use crate::registry::Registry;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Meta-event emitted after each registration, with `(String, ListenerId)`
/// arguments naming the pattern and the new listener.
pub const NEW_LISTENER: &str = "newListener";

/// Meta-event emitted after each single removal, with `(String, ListenerId)`
/// arguments naming the pattern and the removed listener.
///
/// Suppressed when a once-listener is consumed by a dispatch and for bulk
/// clears via [`Emitter::remove_all_listeners`].
pub const REMOVE_LISTENER: &str = "removeListener";

/// Pattern-matched in-process pub/sub emitter.
///
/// Listeners are registered under a pattern (exact name, `*` glob, or the
/// universal `**`) and invoked for every emitted event the pattern matches.
/// Dispatch is snapshot-based: the set of listeners for one emit is fixed
/// when the emit starts, so mutations from inside callbacks or from other
/// threads only affect later emits.
///
/// Cloning is cheap and clones share the same registry, so one emitter can be
/// handed to many threads or tasks.
pub struct Emitter {
    registry: Arc<Registry>,
}

impl Emitter {
    /// Create an emitter with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    /// Register `callback` under `pattern` and return its removal handle.
    ///
    /// Emits [`NEW_LISTENER`] through the same dispatch engine once the
    /// registry mutation is complete. Listeners on the meta-event may
    /// themselves register further listeners.
    pub fn on(
        &self,
        pattern: &str,
        callback: impl Fn(&[Arg]) + Send + Sync + 'static,
    ) -> ListenerId {
        self.register(pattern, Arc::new(callback), false)
    }

    /// Alias for [`Emitter::on`].
    pub fn add_listener(
        &self,
        pattern: &str,
        callback: impl Fn(&[Arg]) + Send + Sync + 'static,
    ) -> ListenerId {
        self.on(pattern, callback)
    }

    /// Register a listener that is removed after its first dispatch.
    pub fn once(
        &self,
        pattern: &str,
        callback: impl Fn(&[Arg]) + Send + Sync + 'static,
    ) -> ListenerId {
        self.register(pattern, Arc::new(callback), true)
    }

    fn register(&self, pattern: &str, callback: Callback, once: bool) -> ListenerId {
        let listener = self.registry.insert(pattern, callback, once);
        let id = listener.id();
        tracing::debug!(pattern, %id, once, "listener registered");
        // The registry lock is already released; meta-event listeners may
        // re-enter the emitter.
        self.emit_sync(NEW_LISTENER, &[arg(pattern.to_string()), arg(id)]);
        id
    }

    /// Remove the first listener under `pattern` whose id matches.
    ///
    /// Emits [`REMOVE_LISTENER`] after the lock is released when something
    /// was removed. No-op when the pattern or id is unknown.
    pub fn remove_listener(&self, pattern: &str, id: ListenerId) -> &Self {
        self.remove_listener_inner(pattern, id, false);
        self
    }

    fn remove_listener_inner(&self, pattern: &str, id: ListenerId, suppress_meta: bool) {
        if self.registry.remove(pattern, id).is_some() {
            tracing::debug!(pattern, %id, "listener removed");
            if !suppress_meta {
                self.emit_sync(REMOVE_LISTENER, &[arg(pattern.to_string()), arg(id)]);
            }
        }
    }

    /// Clear one pattern's listeners, or every listener when `pattern` is
    /// `None`.
    ///
    /// Bulk clears emit no [`REMOVE_LISTENER`] meta-events; only single
    /// removal does.
    pub fn remove_all_listeners(&self, pattern: Option<&str>) -> &Self {
        self.registry.remove_all(pattern);
        tracing::debug!(?pattern, "listeners cleared");
        self
    }

    /// Snapshot of the listeners matching `event_name`.
    ///
    /// Within one pattern the snapshot reflects registration order; the
    /// relative order of listeners from different matching patterns is
    /// unspecified.
    pub fn listeners(&self, event_name: &str) -> Vec<Listener> {
        self.registry.resolve(event_name)
    }

    /// Number of listeners that would be invoked for `event_name`.
    pub fn listeners_count(&self, event_name: &str) -> usize {
        self.registry.resolve(event_name).len()
    }

    /// Currently registered patterns, in no particular order.
    pub fn patterns(&self) -> Vec<EventPattern> {
        self.registry.patterns()
    }

    /// Invoke every matching listener on the calling thread, in snapshot
    /// order.
    ///
    /// Once-listeners are removed from the registry before their callback
    /// runs, so a re-entrant emit from inside the callback cannot re-invoke
    /// them. Callback panics are not caught: a panicking listener aborts the
    /// remainder of this emit's fan-out and propagates to the caller.
    pub fn emit_sync(&self, event_name: &str, args: &[Arg]) -> &Self {
        let snapshot = self.registry.resolve(event_name);
        tracing::trace!(event = event_name, listeners = snapshot.len(), "sync dispatch");
        for listener in snapshot {
            if listener.is_once() {
                self.remove_listener_inner(listener.pattern().as_str(), listener.id(), true);
            }
            listener.invoke(args);
        }
        self
    }

    /// Spawn one Tokio task per matching listener and return immediately.
    ///
    /// Listeners run concurrently with no ordering guarantee, and none may
    /// have run by the time this returns. Once-listener bookkeeping is the
    /// same as for [`Emitter::emit_sync`]. A panicking listener is contained
    /// at its task boundary and logged; it cannot affect the emitter or the
    /// other listeners.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn emit_async(&self, event_name: &str, args: Vec<Arg>) -> &Self {
        let snapshot = self.registry.resolve(event_name);
        tracing::trace!(event = event_name, listeners = snapshot.len(), "async dispatch");
        let args: Arc<[Arg]> = args.into();
        for listener in snapshot {
            if listener.is_once() {
                self.remove_listener_inner(listener.pattern().as_str(), listener.id(), true);
            }
            let args = Arc::clone(&args);
            let event = event_name.to_string();
            tokio::spawn(async move {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.invoke(&args)));
                if outcome.is_err() {
                    tracing::warn!(event = %event, id = %listener.id(), "listener panicked during async dispatch");
                }
            });
        }
        self
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Emitter {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

#[cfg(test)]
#[path = "emitter_tests.rs"]
mod tests;
