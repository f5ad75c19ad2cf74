//! The symbol facade: a thin, lazily-populated view over provider data.

use std::sync::{Arc, OnceLock};

use crate::module::Module;
use crate::provider::RawSymbol;

/// Process-wide symbol identity, assigned in interleaved enumeration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Provider-local symbol key, only meaningful to the owning `ModuleSource`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolKey(pub u64);

/// Classification tag reported by the provider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolTag {
    Udt,
    Enum,
    BaseType,
    Pointer,
    Array,
    Function,
    Data,
    GlobalScope,
}

/// A data member of a UDT. The type is an unresolved name until link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub offset: u64,
}

/// A base class of a UDT, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseClass {
    pub type_name: String,
    pub offset: u64,
}

/// One enumerator. The value text is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: String,
}

/// A symbol as seen by the pipeline.
///
/// `name`, `size` and `tag` are eager; `fields`, `base_classes`,
/// `enum_values` and `namespaces` are computed on first access and cached.
/// Symbols are shared immutable values: the pipeline driver owns them, every
/// other structure holds `Arc` handles.
pub struct Symbol {
    id: SymbolId,
    key: SymbolKey,
    name: String,
    size: u64,
    tag: SymbolTag,
    module: Arc<Module>,
    namespaces: OnceLock<Vec<String>>,
    fields: OnceLock<Vec<Field>>,
    base_classes: OnceLock<Vec<BaseClass>>,
    enum_values: OnceLock<Vec<EnumValue>>,
}

impl Symbol {
    pub fn new(id: SymbolId, raw: RawSymbol, module: Arc<Module>) -> Arc<Self> {
        Arc::new(Self {
            id,
            key: raw.key,
            name: raw.name,
            size: raw.size,
            tag: raw.tag,
            module,
            namespaces: OnceLock::new(),
            fields: OnceLock::new(),
            base_classes: OnceLock::new(),
            enum_values: OnceLock::new(),
        })
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn key(&self) -> SymbolKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn tag(&self) -> SymbolTag {
        self.tag
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    /// Enclosing scope names derived from the symbol name. Empty when the
    /// name does not parse; such symbols are filtered before collection.
    pub fn namespaces(&self) -> &[String] {
        self.namespaces.get_or_init(|| {
            symgen_names::parse(&self.name)
                .map(|parsed| {
                    parsed
                        .namespaces()
                        .into_iter()
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Fields in declaration order, fetched from the provider on first use.
    pub fn fields(&self) -> &[Field] {
        self.fields
            .get_or_init(|| self.module.source().fields(self.key))
    }

    /// Base classes in declaration order, fetched on first use.
    pub fn base_classes(&self) -> &[BaseClass] {
        self.base_classes
            .get_or_init(|| self.module.source().base_classes(self.key))
    }

    /// Enumerators, fetched on first use.
    pub fn enum_values(&self) -> &[EnumValue] {
        self.enum_values
            .get_or_init(|| self.module.source().enum_values(self.key))
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Symbol")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("tag", &self.tag)
            .field("module", &self.module.name())
            .finish_non_exhaustive()
    }
}
