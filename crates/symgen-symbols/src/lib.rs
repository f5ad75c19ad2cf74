//! Module/symbol facade for the symgen wrapper generator.
//!
//! This crate provides:
//! - `SymbolProvider` / `ModuleSource` - the interface a debug-symbol reader
//!   implements (the PDB reader itself lives outside this workspace)
//! - `Module` / `Symbol` - the in-memory view the pipeline works against,
//!   with lazily computed fields and base classes
//! - `GlobalCache` - the process-wide deduplicated name lookup
//! - `deduplicate` - cross-module identity reconciliation with size-based
//!   tie-breaking
//! - `testing` - an in-memory provider for tests

pub mod cache;
pub mod dedup;
pub mod module;
pub mod provider;
pub mod symbol;
pub mod testing;

pub use cache::GlobalCache;
pub use dedup::{DedupResult, SymbolGroup, deduplicate};
pub use module::{Module, ModuleId};
pub use provider::{ModuleDescriptor, ModuleLoadError, ModuleSource, SymbolProvider};
pub use provider::RawSymbol;
pub use symbol::{BaseClass, EnumValue, Field, Symbol, SymbolId, SymbolKey, SymbolTag};
