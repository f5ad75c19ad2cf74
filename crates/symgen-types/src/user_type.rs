//! The generated-type model.
//!
//! Every wrapper the emitter produces is one `UserType` node: a physical
//! struct/class, an enum, a template family primary or one of its
//! specializations, a synthesized namespace container, or the per-module
//! globals aggregate.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;

use symgen_symbols::{ModuleId, Symbol};

use crate::arena::UserTypeId;

/// Namespace every generated file imports; the runtime the wrappers
/// compile against.
pub const DEFAULT_USING: &str = "SymGen";

/// Resolution outcome for a textual type reference.
///
/// `Unresolved` keeps the (transformed) raw name so emission can fall back
/// to it; template link failures are diagnostics, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    User(UserTypeId),
    Placeholder(String),
    Unresolved(String),
}

/// Template bookkeeping for primaries and specializations.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    /// Specializations of the family; populated on the primary only.
    pub specializations: Vec<UserTypeId>,
    /// The owning primary; set on specializations only.
    pub primary: Option<UserTypeId>,
    /// Concrete argument text in positional order, as rendered from the
    /// symbol name. Empty on the primary.
    pub argument_names: Vec<String>,
    /// Argument text to placeholder. Repeated argument types keep their
    /// first placeholder, so `Map<int,int>` binds `int` to `T1`.
    pub bindings: IndexMap<String, String>,
    /// Declared argument count of the family.
    pub arity: usize,
    /// Per-argument resolution in positional order, filled during the link
    /// phase. Empty until linked.
    pub resolved_arguments: Vec<(String, ResolvedType)>,
}

#[derive(Debug, Clone)]
pub enum UserTypeKind {
    /// A struct/class wrapper with typed field accessors.
    Physical,
    /// An enumerated type; values preserved verbatim.
    Enum,
    /// A template family primary or specialization.
    Template(TemplateData),
    /// Synthesized container for namespace paths and missing enclosing
    /// classes. Never has a symbol.
    Namespace,
    /// Per-module aggregate of global-scope data.
    Globals { module: ModuleId },
}

impl UserTypeKind {
    pub fn is_namespace(&self) -> bool {
        matches!(self, Self::Namespace)
    }

    pub fn as_template(&self) -> Option<&TemplateData> {
        match self {
            Self::Template(data) => Some(data),
            _ => None,
        }
    }
}

/// One node of the generated-type graph.
#[derive(Debug)]
pub struct UserType {
    /// Declaring symbol; `None` for synthesized namespace nodes.
    pub symbol: Option<Arc<Symbol>>,
    /// Target namespace from deduplication (common or per-module).
    pub namespace: String,
    pub kind: UserTypeKind,
    /// The emitted class identifier.
    pub constructor_name: String,
    /// Lexical parent in the emitted code; set during post-processing.
    pub declared_in: Option<UserTypeId>,
    /// Nested types attached during post-processing.
    pub children: Vec<UserTypeId>,
    /// Import lines for the generated file, kept sorted.
    pub usings: BTreeSet<String>,
}

impl UserType {
    pub fn new(
        symbol: Option<Arc<Symbol>>,
        namespace: impl Into<String>,
        kind: UserTypeKind,
        constructor_name: impl Into<String>,
    ) -> Self {
        let mut usings = BTreeSet::new();
        usings.insert(DEFAULT_USING.to_string());
        Self {
            symbol,
            namespace: namespace.into(),
            kind,
            constructor_name: constructor_name.into(),
            declared_in: None,
            children: Vec::new(),
            usings,
        }
    }

    /// Records the namespace of a referenced type name in the usings set.
    pub fn note_reference(&mut self, type_name: &str) {
        if let Ok(parsed) = symgen_names::parse(type_name) {
            let namespaces = parsed.namespaces();
            if !namespaces.is_empty() {
                self.usings.insert(namespaces.join("."));
            }
        }
    }

    pub fn is_template_specialization(&self) -> bool {
        matches!(&self.kind, UserTypeKind::Template(data) if data.primary.is_some())
    }

    pub fn is_template_primary(&self) -> bool {
        matches!(&self.kind, UserTypeKind::Template(data) if data.primary.is_none())
    }
}

/// Rewrites a scope name into a legal emitted identifier.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        let valid = c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit());
        out.push(if valid { c } else { '_' });
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::sanitize_identifier;

    #[test]
    fn sanitize_rewrites_invalid_characters() {
        assert_eq!(sanitize_identifier("Foo"), "Foo");
        assert_eq!(sanitize_identifier("operator=="), "operator__");
        assert_eq!(sanitize_identifier("123"), "_23");
        assert_eq!(sanitize_identifier("a b-c"), "a_b_c");
    }
}
