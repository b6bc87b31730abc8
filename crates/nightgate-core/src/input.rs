use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Held-key state keyed by lowercase key name, refreshed by the input collaborator.
///
/// A `BTreeMap` keeps serialized snapshots byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMap {
    keys: BTreeMap<String, bool>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map with every listed key held down.
    pub fn pressed<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for key in keys {
            map.set(key.as_ref(), true);
        }
        map
    }

    /// Record a key as pressed or released. Returns the previous pressed state.
    pub fn set(&mut self, key: &str, pressed: bool) -> bool {
        self.keys
            .insert(normalize_key(key), pressed)
            .unwrap_or(false)
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.keys.get(&normalize_key(key)).copied().unwrap_or(false)
    }

    /// True if any of the given keys is held.
    pub fn any_down<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        keys.iter().any(|k| self.is_down(k.as_ref()))
    }

    /// Keys currently held, in sorted order.
    pub fn held(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|(_, down)| **down)
            .map(|(k, _)| k.as_str())
    }
}

/// Lowercase a key name and fold the spacebar spellings browsers report.
pub fn normalize_key(key: &str) -> String {
    let lower = key.to_lowercase();
    match lower.as_str() {
        " " | "spacebar" => "space".to_string(),
        _ => lower,
    }
}
