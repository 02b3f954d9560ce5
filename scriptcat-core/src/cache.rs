//! Shared resolution cache

use std::collections::HashMap;

use crate::node::Script;

/// Name → script map reused across one resolution session.
///
/// Scripts fetched through the cache keep their content and header caches,
/// so a module is read at most once per session. All scripts in one cache
/// must share a base directory; the cache is keyed by name alone.
#[derive(Debug, Default)]
pub struct SharedCache {
    scripts: HashMap<String, Script>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Script> {
        self.scripts.get(name)
    }

    /// Cached script for `name`, creating it with `make` on first use
    pub fn get_or_insert_with(&mut self, name: &str, make: impl FnOnce() -> Script) -> Script {
        if let Some(script) = self.scripts.get(name) {
            return script.clone();
        }
        let script = make();
        self.scripts.insert(name.to_string(), script.clone());
        script
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Forget every script, so the next session re-reads from disk
    pub fn clear(&mut self) {
        self.scripts.clear();
    }
}
