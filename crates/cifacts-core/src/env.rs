//! Environment-variable sources and the ordered candidate lookup.
//!
//! All fact accessors share one lookup rule: walk an ordered candidate
//! list and return the first variable that is set to a non-empty value.
//! The [`EnvSource`] trait keeps that rule testable without mutating the
//! process environment.

use std::collections::BTreeMap;

use tracing::debug;

/// A read-only source of environment variables.
pub trait EnvSource {
    /// Returns the value of `key`, or `None` when unset or non-unicode.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed map of variables for deterministic lookups.
///
/// Used by tests and by tooling that replays a captured CI environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: BTreeMap<String, String>,
}

impl StaticEnv {
    /// Creates an empty source; every lookup misses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, replacing any previous value for `key`.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for StaticEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Returns the first non-empty value among `candidates`, in order.
///
/// An empty string counts as unset and the walk continues. Later
/// candidates are not consulted once a value is found.
pub fn first_match<E: EnvSource>(env: &E, candidates: &[&str]) -> Option<String> {
    for key in candidates {
        match env.get(key) {
            Some(value) if !value.is_empty() => {
                debug!(key = %key, "environment candidate hit");
                return Some(value);
            }
            _ => {}
        }
    }
    None
}
