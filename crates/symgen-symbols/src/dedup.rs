//! Cross-module symbol deduplication.
//!
//! Modules routinely carry the same type: identical copies, zero-sized
//! forward declarations, or genuinely different layouts under one name.
//! Deduplication collapses the first two cases onto a single representative
//! and keeps the third apart, then decides which namespace each symbol's
//! generated type lands in.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::symbol::{Symbol, SymbolId};

/// One deduplication bucket entry: a representative plus the symbols that
/// collapsed into it. Only the representative's metadata drives emission.
#[derive(Debug, Clone)]
pub struct SymbolGroup {
    pub representative: Arc<Symbol>,
    pub duplicates: Vec<Arc<Symbol>>,
}

impl SymbolGroup {
    fn standalone(symbol: Arc<Symbol>) -> Self {
        Self {
            representative: symbol,
            duplicates: Vec::new(),
        }
    }

    /// The representative followed by its duplicates.
    pub fn members(&self) -> impl Iterator<Item = &Arc<Symbol>> {
        std::iter::once(&self.representative).chain(self.duplicates.iter())
    }
}

/// Deduplicator output: buckets in first-insertion name order, plus the
/// namespace each symbol's generated type is assigned to.
pub struct DedupResult {
    pub groups_by_name: IndexMap<String, Vec<SymbolGroup>>,
    pub namespace_assignment: FxHashMap<SymbolId, String>,
}

impl DedupResult {
    /// Representatives across all buckets, in deterministic output order.
    pub fn winners(&self) -> impl Iterator<Item = &Arc<Symbol>> {
        self.groups_by_name
            .values()
            .flatten()
            .map(|group| &group.representative)
    }

    /// Flattened name-to-symbols view for the global cache.
    pub fn cache_entries(&self) -> FxHashMap<String, Vec<Arc<Symbol>>> {
        self.groups_by_name
            .iter()
            .map(|(name, groups)| {
                let symbols = groups
                    .iter()
                    .flat_map(SymbolGroup::members)
                    .cloned()
                    .collect();
                (name.clone(), symbols)
            })
            .collect()
    }
}

/// Groups symbols by name, collapsing forward declarations into sized
/// definitions and splitting buckets whose members disagree on size.
///
/// The input order is the round-robin interleaved enumeration order; it is
/// the tie-break for every decision below, so the result is deterministic
/// for a fixed enumeration.
pub fn deduplicate(symbols: &[Arc<Symbol>], common_namespace: &str) -> DedupResult {
    let mut groups_by_name: IndexMap<String, Vec<SymbolGroup>> = IndexMap::new();

    for symbol in symbols {
        let groups = groups_by_name
            .entry(symbol.name().to_string())
            .or_default();
        place(groups, symbol.clone());
    }

    // A name with more than one surviving entry is genuinely ambiguous
    // across modules. Unlink its duplicate sets so no later stage picks a
    // single winner for it: every member stands alone.
    for (name, groups) in &mut groups_by_name {
        if groups.len() > 1 {
            debug!(name = name.as_str(), entries = groups.len(), "ambiguous symbol name");
            let flattened = groups
                .drain(..)
                .flat_map(|group| {
                    std::iter::once(group.representative).chain(group.duplicates)
                })
                .map(SymbolGroup::standalone)
                .collect();
            *groups = flattened;
        }
    }

    let mut namespace_assignment = FxHashMap::default();
    for groups in groups_by_name.values() {
        let unambiguous = groups.len() == 1;
        for group in groups {
            for member in group.members() {
                let namespace = if unambiguous {
                    common_namespace.to_string()
                } else {
                    member.module().namespace().to_string()
                };
                namespace_assignment.insert(member.id(), namespace);
            }
        }
    }

    DedupResult {
        groups_by_name,
        namespace_assignment,
    }
}

/// Appends a symbol to a name bucket, comparing against existing entries in
/// insertion order.
fn place(groups: &mut Vec<SymbolGroup>, symbol: Arc<Symbol>) {
    for group in groups.iter_mut() {
        let rep_size = group.representative.size();
        let new_size = symbol.size();

        if rep_size != 0 && new_size != 0 && rep_size != new_size {
            // Size conflict; try the next entry, or split into a new one.
            continue;
        }

        if rep_size == 0 && new_size != 0 {
            // A sized definition displaces a forward declaration as the
            // representative. The displaced symbol and its duplicates are
            // kept, not dropped.
            let displaced = std::mem::replace(&mut group.representative, symbol);
            group.duplicates.push(displaced);
        } else {
            group.duplicates.push(symbol);
        }
        return;
    }

    groups.push(SymbolGroup::standalone(symbol));
}
