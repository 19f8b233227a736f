// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event pattern matching for listener registration

use serde::{Deserialize, Serialize};

/// Pattern a listener is registered under
/// Supports:
///   - Exact: "order.shipped" matches only "order.shipped"
///   - Glob: "order.*" matches any event name starting with "order."
///   - Universal: "**" matches every event name
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventPattern(String);

impl EventPattern {
    /// The universal pattern, matched against every event name.
    pub const UNIVERSAL: &'static str = "**";

    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Check if this pattern matches an event name
    pub fn matches(&self, event_name: &str) -> bool {
        // "**" is a reserved exact-string sentinel, never fed to the glob
        if self.0 == Self::UNIVERSAL {
            return true;
        }
        if self.0 == event_name {
            return true;
        }
        if !self.0.contains('*') {
            return false;
        }

        let name: Vec<char> = event_name.chars().collect();
        let pattern: Vec<char> = self.0.chars().collect();
        glob_match(&name, &pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recursive glob match, left to right, one character at a time.
///
/// Each `*` consumes zero or more characters. Exponential in the worst case
/// (no memoization); event names are short, so backtracking stays bounded.
fn glob_match(name: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some((&'*', pattern_rest)) => {
            // Either the `*` consumes nothing, or it consumes one more
            // character of the name and we retry with the same pattern.
            glob_match(name, pattern_rest)
                || name
                    .split_first()
                    .is_some_and(|(_, name_rest)| glob_match(name_rest, pattern))
        }
        Some((ch, pattern_rest)) => name
            .split_first()
            .is_some_and(|(first, name_rest)| first == ch && glob_match(name_rest, pattern_rest)),
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
