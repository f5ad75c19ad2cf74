//! UserType construction and type-reference resolution.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use symgen_common::{Diagnostic, DiagnosticSink, PipelinePhase};
use symgen_names::{NameSyntaxError, ParsedName};
use symgen_symbols::{GlobalCache, ModuleId, Symbol, SymbolId, SymbolTag};

use crate::arena::{UserTypeArena, UserTypeId};
use crate::template::{TemplateContext, TypeResolver};
use crate::transform::{Transformation, apply_transformations};
use crate::user_type::{
    ResolvedType, TemplateData, UserType, UserTypeKind, sanitize_identifier,
};

/// Emitted class name of the per-module globals aggregate.
pub const MODULE_GLOBALS_NAME: &str = "ModuleGlobals";

/// Builds UserTypes from deduplicated symbols and resolves textual type
/// references against the global cache.
#[derive(Debug)]
pub struct UserTypeFactory {
    arena: UserTypeArena,
    transformations: Vec<Transformation>,
    cache: Arc<GlobalCache>,
    by_symbol: FxHashMap<SymbolId, UserTypeId>,
    namespace_roots: IndexMap<String, UserTypeId>,
}

impl UserTypeFactory {
    pub fn new(cache: Arc<GlobalCache>, transformations: Vec<Transformation>) -> Self {
        Self {
            arena: UserTypeArena::new(),
            transformations,
            cache,
            by_symbol: FxHashMap::default(),
            namespace_roots: IndexMap::new(),
        }
    }

    pub fn arena(&self) -> &UserTypeArena {
        &self.arena
    }

    pub fn cache(&self) -> &GlobalCache {
        &self.cache
    }

    /// Namespace container nodes, one per distinct target namespace, in
    /// creation order. Populated by `process_types`.
    pub fn namespace_roots(&self) -> &IndexMap<String, UserTypeId> {
        &self.namespace_roots
    }

    /// Applies the configured transformations to a type name; first match
    /// wins.
    pub fn transform(&self, type_name: &str) -> String {
        apply_transformations(&self.transformations, type_name)
    }

    /// Creates the UserType for one deduplicated symbol. Template-named UDTs
    /// become a single-member family; use `add_symbols` to group an entire
    /// family at once.
    pub fn add_symbol(
        &mut self,
        symbol: Arc<Symbol>,
        namespace: &str,
    ) -> Result<UserTypeId, NameSyntaxError> {
        match symbol.tag() {
            SymbolTag::Enum => {
                let parsed = symgen_names::parse(symbol.name())?;
                let constructor = sanitize_identifier(parsed.last_name());
                let user_type =
                    UserType::new(Some(symbol.clone()), namespace, UserTypeKind::Enum, constructor);
                let id = self.arena.alloc(user_type);
                self.by_symbol.insert(symbol.id(), id);
                Ok(id)
            }
            SymbolTag::GlobalScope => Ok(self.add_globals(symbol, namespace)),
            _ => {
                let parsed = symgen_names::parse(symbol.name())?;
                if parsed.is_template() {
                    let ids = self.add_symbols(std::slice::from_ref(&symbol), namespace)?;
                    Ok(ids[0])
                } else {
                    let constructor = sanitize_identifier(parsed.last_name());
                    let mut user_type = UserType::new(
                        Some(symbol.clone()),
                        namespace,
                        UserTypeKind::Physical,
                        constructor,
                    );
                    note_member_references(&mut user_type, &symbol);
                    let id = self.arena.alloc(user_type);
                    self.by_symbol.insert(symbol.id(), id);
                    Ok(id)
                }
            }
        }
    }

    /// Creates one template family: a primary generic wrapper plus one
    /// specialization per input symbol, all sharing the primary.
    ///
    /// Returns the primary first, then the specializations in input order.
    pub fn add_symbols(
        &mut self,
        symbols: &[Arc<Symbol>],
        namespace: &str,
    ) -> Result<Vec<UserTypeId>, NameSyntaxError> {
        let first = symbols.first().expect("a template family is never empty");
        let first_parsed = symgen_names::parse(first.name())?;
        let family_arity = first_parsed.template_arguments().len();
        let bare = sanitize_identifier(first_parsed.last_name());

        let mut primary_type = UserType::new(
            Some(first.clone()),
            namespace,
            UserTypeKind::Template(TemplateData {
                arity: family_arity,
                ..TemplateData::default()
            }),
            bare.clone(),
        );
        note_member_references(&mut primary_type, first);
        let primary = self.arena.alloc(primary_type);

        let mut ids = vec![primary];
        for symbol in symbols {
            let parsed = symgen_names::parse(symbol.name())?;
            let (argument_names, bindings) = argument_bindings(&parsed);
            if argument_names.len() != family_arity {
                warn!(
                    symbol = symbol.name(),
                    family = %first_parsed.family_name(),
                    expected = family_arity,
                    actual = argument_names.len(),
                    "template specialization arity differs from its family"
                );
            }
            let arity = argument_names.len();
            let mut specialization = UserType::new(
                Some(symbol.clone()),
                namespace,
                UserTypeKind::Template(TemplateData {
                    primary: Some(primary),
                    argument_names,
                    bindings,
                    arity,
                    ..TemplateData::default()
                }),
                format!("{bare}_{arity}"),
            );
            note_member_references(&mut specialization, symbol);
            let id = self.arena.alloc(specialization);
            self.by_symbol.insert(symbol.id(), id);
            if let UserTypeKind::Template(data) = &mut self.arena.get_mut(primary).kind {
                data.specializations.push(id);
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn add_globals(&mut self, symbol: Arc<Symbol>, namespace: &str) -> UserTypeId {
        let module = symbol.module().id();
        let mut user_type = UserType::new(
            Some(symbol.clone()),
            namespace,
            UserTypeKind::Globals { module },
            MODULE_GLOBALS_NAME,
        );
        note_member_references(&mut user_type, &symbol);
        let id = self.arena.alloc(user_type);
        self.by_symbol.insert(symbol.id(), id);
        id
    }

    /// The UserType constructed for a symbol, if any.
    pub fn get_user_type(&self, symbol: &Symbol) -> Option<UserTypeId> {
        self.by_symbol.get(&symbol.id()).copied()
    }

    /// Looks a type up by textual name through the global cache, preferring
    /// a symbol from the referring module when the name is ambiguous.
    pub fn try_get_user_type(
        &self,
        referrer: Option<ModuleId>,
        type_name: &str,
    ) -> Option<UserTypeId> {
        let candidates = self.cache.symbols(type_name);
        let mut fallback = None;
        for candidate in &candidates {
            let Some(&id) = self.by_symbol.get(&candidate.id()) else {
                continue;
            };
            if referrer.is_some_and(|m| candidate.module().id() == m) {
                return Some(id);
            }
            if fallback.is_none() {
                fallback = Some(id);
            }
        }
        fallback
    }

    /// Resolution entry point shared by the base factory and the template
    /// decorator. Template-argument names are checked both before and after
    /// transformation; the raw symbol-name spelling is what argument vectors
    /// record.
    pub fn resolve_with_context(
        &self,
        referrer: Option<ModuleId>,
        type_name: &str,
        context: Option<&TemplateContext>,
    ) -> ResolvedType {
        if let Some(context) = context {
            if let Some(placeholder) = context.try_get_argument(type_name) {
                return ResolvedType::Placeholder(placeholder.to_string());
            }
        }
        let transformed = self.transform(type_name);
        if let Some(context) = context {
            if transformed != type_name {
                if let Some(placeholder) = context.try_get_argument(&transformed) {
                    return ResolvedType::Placeholder(placeholder.to_string());
                }
            }
        }
        match self.try_get_user_type(referrer, type_name) {
            Some(id) => ResolvedType::User(id),
            None => ResolvedType::Unresolved(transformed),
        }
    }

    /// Link phase: resolve every specialization's argument vector and check
    /// its member references inside the template context. Failures degrade
    /// to raw names; they never abort the pipeline.
    pub fn update_template_arguments(&mut self, sink: &DiagnosticSink) {
        let specialization_ids: Vec<UserTypeId> = self
            .arena
            .iter()
            .filter(|(_, ty)| ty.is_template_specialization())
            .map(|(id, _)| id)
            .collect();

        for id in specialization_ids {
            let resolved = self.link_one_specialization(id, sink);
            if let UserTypeKind::Template(data) = &mut self.arena.get_mut(id).kind {
                data.resolved_arguments = resolved;
            }
        }
    }

    fn link_one_specialization(
        &self,
        id: UserTypeId,
        sink: &DiagnosticSink,
    ) -> Vec<(String, ResolvedType)> {
        let user_type = self.arena.get(id);
        let symbol = user_type
            .symbol
            .as_ref()
            .expect("template specializations always have a symbol");
        let module = symbol.module().id();
        let UserTypeKind::Template(data) = &user_type.kind else {
            unreachable!("link_one_specialization called on a non-template");
        };

        let mut context = TemplateContext::new();
        context.push(data.bindings.clone());

        let mut resolved_arguments = Vec::with_capacity(data.argument_names.len());
        for argument in &data.argument_names {
            let resolved = self.resolve_with_context(Some(module), argument, None);
            if let ResolvedType::Unresolved(raw) = &resolved {
                debug!(
                    symbol = symbol.name(),
                    argument = argument.as_str(),
                    "template argument did not resolve; keeping raw name"
                );
                if cfg!(debug_assertions) {
                    sink.push(
                        Diagnostic::warning(
                            PipelinePhase::LinkTemplates,
                            format!("template argument `{raw}` did not resolve to a generated type"),
                        )
                        .with_module(symbol.module().name())
                        .with_symbol(symbol.name()),
                    );
                }
            }
            resolved_arguments.push((argument.clone(), resolved));
        }

        // Member references are re-resolved at emit time; checking them here
        // surfaces link problems while the phase context is still known.
        for field in symbol.fields() {
            if let ResolvedType::Unresolved(raw) =
                self.resolve_with_context(Some(module), &field.type_name, Some(&context))
            {
                debug!(
                    symbol = symbol.name(),
                    field = field.name.as_str(),
                    type_name = raw.as_str(),
                    "template member type did not resolve"
                );
            }
        }
        for base in symbol.base_classes() {
            if let ResolvedType::Unresolved(raw) =
                self.resolve_with_context(Some(module), &base.type_name, Some(&context))
            {
                debug!(
                    symbol = symbol.name(),
                    base = raw.as_str(),
                    "template base type did not resolve"
                );
            }
        }

        resolved_arguments
    }

    /// Post-processing: compute `declared_in` for every type, synthesizing
    /// namespace containers for namespace paths and for enclosing class
    /// names that have no generated type of their own.
    pub fn process_types(&mut self) -> Vec<UserTypeId> {
        // Scope paths of every attachable type, bare names joined with `::`.
        // First allocation wins on collision; ambiguous names differ in
        // their target namespace, so real collisions are rare.
        let mut by_path: FxHashMap<(String, String), UserTypeId> = FxHashMap::default();
        let mut ordered: Vec<(UserTypeId, Vec<String>)> = Vec::new();

        for (id, user_type) in self.arena.iter() {
            if user_type.kind.is_namespace() || user_type.is_template_specialization() {
                continue;
            }
            let path = scope_path(user_type);
            by_path
                .entry((user_type.namespace.clone(), path.join("::")))
                .or_insert(id);
            ordered.push((id, path));
        }

        let mut synthesized: FxHashMap<(String, String), UserTypeId> = FxHashMap::default();
        for (id, path) in ordered {
            let namespace = self.arena.get(id).namespace.clone();
            let mut parent = self.namespace_root(&namespace);
            let mut prefix = String::new();
            for component in &path[..path.len() - 1] {
                if !prefix.is_empty() {
                    prefix.push_str("::");
                }
                prefix.push_str(component);
                let key = (namespace.clone(), prefix.clone());
                parent = if let Some(&existing) = by_path.get(&key) {
                    Some(existing)
                } else if let Some(&node) = synthesized.get(&key) {
                    Some(node)
                } else {
                    let node = self.arena.alloc(UserType::new(
                        None,
                        namespace.clone(),
                        UserTypeKind::Namespace,
                        sanitize_identifier(component),
                    ));
                    synthesized.insert(key, node);
                    self.attach(parent, node);
                    Some(node)
                };
            }
            self.attach(parent, id);
        }

        // Specializations live inside their primary's emission; parent them
        // there so the skip rule keeps them out of per-file output.
        let specializations: Vec<(UserTypeId, UserTypeId)> = self
            .arena
            .iter()
            .filter_map(|(id, ty)| match &ty.kind {
                UserTypeKind::Template(data) => data.primary.map(|primary| (id, primary)),
                _ => None,
            })
            .collect();
        for (id, primary) in specializations {
            self.arena.get_mut(id).declared_in = Some(primary);
        }

        self.namespace_roots.values().copied().collect()
    }

    fn namespace_root(&mut self, namespace: &str) -> Option<UserTypeId> {
        if namespace.is_empty() {
            return None;
        }
        if let Some(&root) = self.namespace_roots.get(namespace) {
            return Some(root);
        }
        let root = self.arena.alloc(UserType::new(
            None,
            namespace,
            UserTypeKind::Namespace,
            namespace,
        ));
        self.namespace_roots.insert(namespace.to_string(), root);
        Some(root)
    }

    fn attach(&mut self, parent: Option<UserTypeId>, child: UserTypeId) {
        self.arena.get_mut(child).declared_in = parent;
        if let Some(parent) = parent {
            self.arena.get_mut(parent).children.push(child);
        }
    }
}

impl TypeResolver for UserTypeFactory {
    fn arena(&self) -> &UserTypeArena {
        &self.arena
    }

    fn resolve(&self, referrer: Option<ModuleId>, type_name: &str) -> ResolvedType {
        self.resolve_with_context(referrer, type_name, None)
    }
}

/// Seeds a UserType's usings from the namespaces its members reference.
fn note_member_references(user_type: &mut UserType, symbol: &Symbol) {
    if !matches!(
        symbol.tag(),
        SymbolTag::Udt | SymbolTag::GlobalScope
    ) {
        return;
    }
    let field_types: Vec<String> = symbol
        .fields()
        .iter()
        .map(|f| f.type_name.clone())
        .collect();
    for type_name in field_types {
        user_type.note_reference(&type_name);
    }
    let base_types: Vec<String> = symbol
        .base_classes()
        .iter()
        .map(|b| b.type_name.clone())
        .collect();
    for type_name in base_types {
        user_type.note_reference(&type_name);
    }
}

/// Scope bare names for graph placement. Symbols whose names do not parse
/// (the per-module globals container) contribute their constructor name.
fn scope_path(user_type: &UserType) -> Vec<String> {
    let parsed: Option<ParsedName> = user_type
        .symbol
        .as_ref()
        .and_then(|symbol| symgen_names::parse(symbol.name()).ok());
    match parsed {
        Some(parsed) => parsed
            .scopes
            .iter()
            .map(|scope| scope.bare_name.clone())
            .collect(),
        None => vec![user_type.constructor_name.clone()],
    }
}

/// Binds each template argument of a parsed name to its positional
/// placeholder, `T1` onward. Repeated argument types bind to their first
/// placeholder.
pub fn argument_bindings(parsed: &ParsedName) -> (Vec<String>, IndexMap<String, String>) {
    let mut names = Vec::new();
    let mut bindings = IndexMap::new();
    for (i, argument) in parsed.template_arguments().iter().enumerate() {
        let rendered = argument.render();
        bindings
            .entry(rendered.clone())
            .or_insert_with(|| format!("T{}", i + 1));
        names.push(rendered);
    }
    (names, bindings)
}
