//! Process-wide deduplicated symbol lookup.

use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use crate::symbol::Symbol;

/// Name-to-symbols lookup populated once from the deduplicator output and
/// read concurrently by the factory during link.
///
/// `update` swaps the whole table under the write lock, so readers observe
/// either the previous table or the complete new one, never a partial fill.
#[derive(Debug, Default)]
pub struct GlobalCache {
    entries: RwLock<FxHashMap<String, Vec<Arc<Symbol>>>>,
}

impl GlobalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache contents atomically.
    pub fn update(&self, entries: FxHashMap<String, Vec<Arc<Symbol>>>) {
        *self.entries.write().expect("global cache lock poisoned") = entries;
    }

    /// The representative symbol for a deduplicated name, if any.
    pub fn symbol(&self, name: &str) -> Option<Arc<Symbol>> {
        self.entries
            .read()
            .expect("global cache lock poisoned")
            .get(name)
            .and_then(|symbols| symbols.first().cloned())
    }

    /// Every equivalent symbol recorded under a name.
    pub fn symbols(&self, name: &str) -> Vec<Arc<Symbol>> {
        self.entries
            .read()
            .expect("global cache lock poisoned")
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("global cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
