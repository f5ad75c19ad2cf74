//! A `SymbolProvider` over JSON symbol dumps.
//!
//! Real runs read PDBs through an external provider; this one consumes a
//! plain JSON dump of the same shape, which keeps the binary usable for
//! development and end-to-end testing without a native debug stack.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use symgen_symbols::{
    BaseClass, EnumValue, Field, ModuleDescriptor, ModuleLoadError, ModuleSource, RawSymbol,
    SymbolKey, SymbolProvider, SymbolTag,
};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
enum JsonTag {
    Udt,
    Enum,
    BaseType,
    Pointer,
    Array,
    Function,
    Data,
}

impl From<JsonTag> for SymbolTag {
    fn from(tag: JsonTag) -> Self {
        match tag {
            JsonTag::Udt => Self::Udt,
            JsonTag::Enum => Self::Enum,
            JsonTag::BaseType => Self::BaseType,
            JsonTag::Pointer => Self::Pointer,
            JsonTag::Array => Self::Array,
            JsonTag::Function => Self::Function,
            JsonTag::Data => Self::Data,
        }
    }
}

fn default_tag() -> JsonTag {
    JsonTag::Udt
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonField {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    offset: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonBaseClass {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    offset: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonEnumValue {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonType {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default = "default_tag")]
    tag: JsonTag,
    #[serde(default)]
    fields: Vec<JsonField>,
    #[serde(default)]
    base_classes: Vec<JsonBaseClass>,
    #[serde(default)]
    enum_values: Vec<JsonEnumValue>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct JsonModule {
    #[serde(default)]
    types: Vec<JsonType>,
    #[serde(default)]
    globals: Vec<JsonField>,
}

const GLOBAL_SCOPE_KEY: SymbolKey = SymbolKey(u64::MAX);

struct JsonModuleSource {
    module: JsonModule,
}

impl JsonModuleSource {
    fn raw(&self, index: usize, ty: &JsonType) -> RawSymbol {
        RawSymbol {
            key: SymbolKey(index as u64),
            name: ty.name.clone(),
            size: ty.size,
            tag: ty.tag.into(),
        }
    }
}

impl ModuleSource for JsonModuleSource {
    fn find_global_type_wildcard(&self, pattern: &str) -> Vec<RawSymbol> {
        self.module
            .types
            .iter()
            .enumerate()
            .filter(|(_, ty)| wildcard_matches(pattern, &ty.name))
            .map(|(i, ty)| self.raw(i, ty))
            .collect()
    }

    fn all_types(&self) -> Vec<RawSymbol> {
        self.module
            .types
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
            return self
                .module
                .globals
                .iter()
                .map(|field| Field {
                    name: field.name.clone(),
                    type_name: field.type_name.clone(),
                    offset: field.offset,
                })
                .collect();
        }
        self.module
            .types
            .get(key.0 as usize)
            .map(|ty| {
                ty.fields
                    .iter()
                    .map(|field| Field {
                        name: field.name.clone(),
                        type_name: field.type_name.clone(),
                        offset: field.offset,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn base_classes(&self, key: SymbolKey) -> Vec<BaseClass> {
        self.module
            .types
            .get(key.0 as usize)
            .map(|ty| {
                ty.base_classes
                    .iter()
                    .map(|base| BaseClass {
                        type_name: base.type_name.clone(),
                        offset: base.offset,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn enum_values(&self, key: SymbolKey) -> Vec<EnumValue> {
        self.module
            .types
            .get(key.0 as usize)
            .map(|ty| {
                ty.enum_values
                    .iter()
                    .map(|value| EnumValue {
                        name: value.name.clone(),
                        value: value.value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Opens each configured module path as a JSON symbol dump.
#[derive(Default)]
pub struct JsonSymbolProvider;

impl JsonSymbolProvider {
    pub fn new() -> Self {
        Self
    }

    fn load(path: &Path) -> Result<JsonModule, String> {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&text).map_err(|e| e.to_string())
    }
}

impl SymbolProvider for JsonSymbolProvider {
    fn open_module(
        &self,
        descriptor: &ModuleDescriptor,
    ) -> Result<Arc<dyn ModuleSource>, ModuleLoadError> {
        let module = Self::load(&descriptor.path).map_err(|reason| ModuleLoadError {
            module: descriptor.name.clone(),
            reason,
        })?;
        Ok(Arc::new(JsonModuleSource { module }))
    }
}

/// `*`-wildcard match over full names.
fn wildcard_matches(pattern: &str, name: &str) -> bool {
    fn matches(pattern: &[u8], name: &[u8]) -> bool {
        match pattern.split_first() {
            None => name.is_empty(),
            Some((&b'*', rest)) => (0..=name.len()).any(|skip| matches(rest, &name[skip..])),
            Some((&p, rest)) => name
                .split_first()
                .is_some_and(|(&n, tail)| p == n && matches(rest, tail)),
        }
    }
    matches(pattern.as_bytes(), name.as_bytes())
}
