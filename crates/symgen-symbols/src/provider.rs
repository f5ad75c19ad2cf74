//! Interfaces implemented by a debug-symbol reader.
//!
//! The generator never touches PDB files directly; it consumes these traits.
//! A provider hands out one `ModuleSource` per opened module, and the source
//! answers type enumeration and member queries keyed by provider-local
//! symbol keys.

use crate::symbol::{BaseClass, EnumValue, Field, SymbolKey, SymbolTag};

/// One module entry from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Path to the module image or its symbol file.
    pub path: std::path::PathBuf,
    /// Short module name used in diagnostics.
    pub name: String,
    /// Namespace generated types fall back to when the deduplicated name is
    /// ambiguous across modules.
    pub namespace: String,
}

/// Raw symbol data as enumerated by a provider, before the facade wraps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSymbol {
    pub key: SymbolKey,
    pub name: String,
    pub size: u64,
    pub tag: SymbolTag,
}

/// A provider cannot open a module. Fatal: the pipeline aborts.
#[derive(Debug, Clone)]
pub struct ModuleLoadError {
    pub module: String,
    pub reason: String,
}

impl std::fmt::Display for ModuleLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to load module `{}`: {}", self.module, self.reason)
    }
}

impl std::error::Error for ModuleLoadError {}

/// Symbol access for one opened module. Implementations must be shareable
/// across worker threads; member queries may be called concurrently.
pub trait ModuleSource: Send + Sync {
    /// All type symbols matching a `*` wildcard pattern.
    fn find_global_type_wildcard(&self, pattern: &str) -> Vec<RawSymbol>;

    /// Every type symbol in the module.
    fn all_types(&self) -> Vec<RawSymbol>;

    /// The module's global-scope container symbol.
    fn global_scope(&self) -> RawSymbol;

    /// Fields of a UDT, in declaration order.
    fn fields(&self, key: SymbolKey) -> Vec<Field>;

    /// Base classes of a UDT, in declaration order.
    fn base_classes(&self, key: SymbolKey) -> Vec<BaseClass>;

    /// Enumerators of an enum, in declaration order.
    fn enum_values(&self, key: SymbolKey) -> Vec<EnumValue>;
}

/// The debug-symbol reader entry point.
pub trait SymbolProvider: Send + Sync {
    fn open_module(
        &self,
        descriptor: &ModuleDescriptor,
    ) -> Result<std::sync::Arc<dyn ModuleSource>, ModuleLoadError>;
}
