// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener records and the opaque dispatch argument type

use crate::pattern::EventPattern;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque argument passed to listeners.
///
/// The emitter never inspects the payload; listeners downcast to the types
/// they expect.
pub type Arg = Arc<dyn Any + Send + Sync>;

/// Callback signature for listeners.
pub type Callback = Arc<dyn Fn(&[Arg]) + Send + Sync>;

/// Wrap a value as a dispatch argument.
pub fn arg<T: Any + Send + Sync>(value: T) -> Arg {
    Arc::new(value)
}

/// Handle returned at registration, used to remove the listener later.
///
/// Closures cannot be compared for identity, so removal is by handle rather
/// than by passing the callback again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered callback together with its dispatch bookkeeping
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    pattern: EventPattern,
    callback: Callback,
    once: bool,
}

impl Listener {
    pub(crate) fn new(id: ListenerId, pattern: EventPattern, callback: Callback, once: bool) -> Self {
        Self {
            id,
            pattern,
            callback,
            once,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Pattern this listener was registered under
    pub fn pattern(&self) -> &EventPattern {
        &self.pattern
    }

    /// True if the listener is removed after its first dispatch
    pub fn is_once(&self) -> bool {
        self.once
    }

    pub(crate) fn invoke(&self, args: &[Arg]) {
        (self.callback)(args);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
