//! In-memory symbol provider for tests.
//!
//! Mirrors what a real PDB-backed provider hands the pipeline, minus the
//! file format: modules are built up from literal type descriptions.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::provider::{
    ModuleDescriptor, ModuleLoadError, ModuleSource, RawSymbol, SymbolProvider,
};
use crate::symbol::{BaseClass, EnumValue, Field, SymbolKey, SymbolTag};

const GLOBAL_SCOPE_KEY: SymbolKey = SymbolKey(u64::MAX);

/// One type in a test module.
#[derive(Debug, Clone)]
pub struct TestType {
    pub name: String,
    pub size: u64,
    pub tag: SymbolTag,
    pub fields: Vec<Field>,
    pub base_classes: Vec<BaseClass>,
    pub enum_values: Vec<EnumValue>,
}

impl TestType {
    pub fn udt(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            tag: SymbolTag::Udt,
            fields: Vec::new(),
            base_classes: Vec::new(),
            enum_values: Vec::new(),
        }
    }

    pub fn enumeration(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            tag: SymbolTag::Enum,
            fields: Vec::new(),
            base_classes: Vec::new(),
            enum_values: Vec::new(),
        }
    }

    pub fn with_tag(name: &str, size: u64, tag: SymbolTag) -> Self {
        Self {
            name: name.to_string(),
            size,
            tag,
            fields: Vec::new(),
            base_classes: Vec::new(),
            enum_values: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, type_name: &str, offset: u64) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            type_name: type_name.to_string(),
            offset,
        });
        self
    }

    pub fn base(mut self, type_name: &str, offset: u64) -> Self {
        self.base_classes.push(BaseClass {
            type_name: type_name.to_string(),
            offset,
        });
        self
    }

    pub fn value(mut self, name: &str, value: &str) -> Self {
        self.enum_values.push(EnumValue {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }
}

/// An in-memory module. Symbol keys are indices into the type list.
#[derive(Debug, Default)]
pub struct TestModule {
    types: Vec<TestType>,
    globals: Vec<Field>,
}

impl TestModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, ty: TestType) -> Self {
        self.types.push(ty);
        self
    }

    /// Adds a module-global variable to the global-scope container.
    pub fn with_global(mut self, name: &str, type_name: &str, address: u64) -> Self {
        self.globals.push(Field {
            name: name.to_string(),
            type_name: type_name.to_string(),
            offset: address,
        });
        self
    }

    fn raw(&self, index: usize, ty: &TestType) -> RawSymbol {
        RawSymbol {
            key: SymbolKey(index as u64),
            name: ty.name.clone(),
            size: ty.size,
            tag: ty.tag,
        }
    }
}

impl ModuleSource for TestModule {
    fn find_global_type_wildcard(&self, pattern: &str) -> Vec<RawSymbol> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, ty)| wildcard_matches(pattern, &ty.name))
            .map(|(i, ty)| self.raw(i, ty))
            .collect()
    }

    fn all_types(&self) -> Vec<RawSymbol> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| self.raw(i, ty))
            .collect()
    }

    fn global_scope(&self) -> RawSymbol {
        RawSymbol {
            key: GLOBAL_SCOPE_KEY,
            name: "<module-globals>".to_string(),
            size: 0,
            tag: SymbolTag::GlobalScope,
        }
    }

    fn fields(&self, key: SymbolKey) -> Vec<Field> {
        if key == GLOBAL_SCOPE_KEY {
            return self.globals.clone();
        }
        self.types
            .get(key.0 as usize)
            .map(|ty| ty.fields.clone())
            .unwrap_or_default()
    }

    fn base_classes(&self, key: SymbolKey) -> Vec<BaseClass> {
        self.types
            .get(key.0 as usize)
            .map(|ty| ty.base_classes.clone())
            .unwrap_or_default()
    }

    fn enum_values(&self, key: SymbolKey) -> Vec<EnumValue> {
        self.types
            .get(key.0 as usize)
            .map(|ty| ty.enum_values.clone())
            .unwrap_or_default()
    }
}

/// Provider over a fixed set of named in-memory modules.
#[derive(Default)]
pub struct TestProvider {
    modules: FxHashMap<String, Arc<TestModule>>,
}

impl TestProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, name: &str, module: TestModule) -> Self {
        self.modules.insert(name.to_string(), Arc::new(module));
        self
    }
}

impl SymbolProvider for TestProvider {
    fn open_module(
        &self,
        descriptor: &ModuleDescriptor,
    ) -> Result<Arc<dyn ModuleSource>, ModuleLoadError> {
        self.modules
            .get(&descriptor.name)
            .cloned()
            .map(|module| module as Arc<dyn ModuleSource>)
            .ok_or_else(|| ModuleLoadError {
                module: descriptor.name.clone(),
                reason: "no such test module".to_string(),
            })
    }
}

/// `*`-wildcard match over full names.
fn wildcard_matches(pattern: &str, name: &str) -> bool {
    fn matches(pattern: &[u8], name: &[u8]) -> bool {
        match pattern.split_first() {
            None => name.is_empty(),
            Some((&b'*', rest)) => {
                (0..=name.len()).any(|skip| matches(rest, &name[skip..]))
            }
            Some((&p, rest)) => name.split_first().is_some_and(|(&n, tail)| {
                p == n && matches(rest, tail)
            }),
        }
    }
    matches(pattern.as_bytes(), name.as_bytes())
}
