//! Renders UserTypes to wrapper source.
//!
//! Output is C#-flavored: one class per UDT deriving from the `UserType`
//! runtime base, field accessors parameterized by field offset and type,
//! base classes as compositional accessors, enums with verbatim values and
//! template families as generic classes carrying specialization descriptors.

use tracing::debug;

use symgen_common::GenerationFlags;
use symgen_symbols::{Symbol, SymbolTag};
use symgen_types::{
    ResolvedType, TemplateContext, TemplateUserTypeFactory, TypeResolver, UserTypeFactory,
    UserTypeId, UserTypeKind,
};

use crate::writer::IndentedWriter;

/// Nesting limit when inlining anonymous UDT fields.
const MAX_INLINE_DEPTH: usize = 4;

pub struct CodeEmitter {
    flags: GenerationFlags,
}

impl CodeEmitter {
    pub fn new(flags: GenerationFlags) -> Self {
        Self { flags }
    }

    fn compressed(&self) -> bool {
        self.flags.contains(GenerationFlags::COMPRESSED_OUTPUT)
    }

    fn field_reader(&self) -> &'static str {
        if self.flags.contains(GenerationFlags::CACHE_USER_TYPE_FIELDS) {
            "GetCachedField"
        } else {
            "GetField"
        }
    }

    /// Renders one top-level type as a complete file: usings, the namespace
    /// wrapper chain, then the type with its nested types inline.
    pub fn render_file(
        &self,
        factory: &UserTypeFactory,
        id: UserTypeId,
        writer: &mut dyn IndentedWriter,
    ) {
        let arena = factory.arena();
        let user_type = arena.get(id);
        for using in &user_type.usings {
            writer.write_line(&format!("using {using};"));
        }
        if !user_type.usings.is_empty() {
            writer.blank_line();
        }

        let namespace = namespace_path(factory, id);
        if namespace.is_empty() {
            self.emit_type(factory, factory, id, writer);
        } else {
            writer.write_line(&format!("namespace {namespace}"));
            writer.write_line("{");
            writer.indent();
            self.emit_type(factory, factory, id, writer);
            writer.dedent();
            writer.write_line("}");
        }
    }

    /// Renders every namespace root into one buffer, usings first.
    pub fn render_single_file(&self, factory: &UserTypeFactory, writer: &mut dyn IndentedWriter) {
        let arena = factory.arena();
        let mut usings = std::collections::BTreeSet::new();
        for (_, user_type) in arena.iter() {
            usings.extend(user_type.usings.iter().cloned());
        }
        for using in &usings {
            writer.write_line(&format!("using {using};"));
        }
        if !usings.is_empty() {
            writer.blank_line();
        }

        let mut first = true;
        for &root in factory.namespace_roots().values() {
            if arena.get(root).children.is_empty() {
                continue;
            }
            if !first && !self.compressed() {
                writer.blank_line();
            }
            first = false;
            self.emit_type(factory, factory, root, writer);
        }
    }

    /// Emits one type and its nested types. Dispatches on the variant.
    pub fn emit_type(
        &self,
        factory: &UserTypeFactory,
        resolver: &dyn TypeResolver,
        id: UserTypeId,
        writer: &mut dyn IndentedWriter,
    ) {
        let user_type = factory.arena().get(id);
        if let Some(symbol) = &user_type.symbol {
            if symbol.tag() == SymbolTag::BaseType {
                return;
            }
        }
        match &user_type.kind {
            UserTypeKind::Physical => self.emit_physical(factory, resolver, id, writer),
            UserTypeKind::Enum => self.emit_enum(factory, id, writer),
            UserTypeKind::Template(data) => {
                if data.primary.is_none() {
                    self.emit_template_primary(factory, id, writer);
                }
                // Specializations surface through the primary's descriptors.
            }
            UserTypeKind::Namespace => self.emit_namespace(factory, resolver, id, writer),
            UserTypeKind::Globals { .. } => self.emit_globals(factory, resolver, id, writer),
        }
    }

    fn emit_namespace(
        &self,
        factory: &UserTypeFactory,
        resolver: &dyn TypeResolver,
        id: UserTypeId,
        writer: &mut dyn IndentedWriter,
    ) {
        let arena = factory.arena();
        let user_type = arena.get(id);
        if user_type.children.is_empty() {
            return;
        }
        // A container with a class among its ancestors cannot be a C#
        // namespace; it degrades to a static holder class.
        let keyword = if arena.has_only_namespace_ancestors(id) {
            format!("namespace {}", user_type.constructor_name)
        } else {
            format!("public static class {}", user_type.constructor_name)
        };
        writer.write_line(&keyword);
        writer.write_line("{");
        writer.indent();
        let mut first = true;
        for &child in &user_type.children {
            if !first && !self.compressed() {
                writer.blank_line();
            }
            first = false;
            self.emit_type(factory, resolver, child, writer);
        }
        writer.dedent();
        writer.write_line("}");
    }

    fn emit_class_header(
        &self,
        name_line: &str,
        constructor_name: &str,
        writer: &mut dyn IndentedWriter,
    ) {
        writer.write_line(name_line);
        writer.write_line("{");
        writer.indent();
        writer.write_line(&format!("public {constructor_name}(Variable variable)"));
        writer.indent();
        writer.write_line(": base(variable)");
        writer.dedent();
        writer.write_line("{");
        writer.write_line("}");
    }

    fn emit_physical(
        &self,
        factory: &UserTypeFactory,
        resolver: &dyn TypeResolver,
        id: UserTypeId,
        writer: &mut dyn IndentedWriter,
    ) {
        let user_type = factory.arena().get(id);
        let symbol = user_type
            .symbol
            .as_ref()
            .expect("physical types always have a symbol");
        let referrer = Some(symbol.module().id());

        self.emit_class_header(
            &format!("public class {} : UserType", user_type.constructor_name),
            &user_type.constructor_name,
            writer,
        );

        for base in symbol.base_classes() {
            if !self.compressed() {
                writer.blank_line();
            }
            let base_ref = self.type_ref(resolver, referrer, &base.type_name);
            let accessor = accessor_name(&base.type_name);
            writer.write_line(&format!(
                "public {base_ref} {accessor} {{ get {{ return ReadBase<{base_ref}>({}); }} }}",
                base.offset
            ));
        }

        self.emit_fields(factory, resolver, symbol, 0, 0, writer);

        for &child in &user_type.children {
            if !self.compressed() {
                writer.blank_line();
            }
            self.emit_type(factory, resolver, child, writer);
        }

        writer.dedent();
        writer.write_line("}");
    }

    /// Field accessors; anonymous nested UDTs are flattened into the parent
    /// at their combined offset.
    fn emit_fields(
        &self,
        factory: &UserTypeFactory,
        resolver: &dyn TypeResolver,
        symbol: &Symbol,
        base_offset: u64,
        depth: usize,
        writer: &mut dyn IndentedWriter,
    ) {
        let reader = self.field_reader();
        for field in symbol.fields() {
            let offset = base_offset + field.offset;
            if depth < MAX_INLINE_DEPTH && is_anonymous_type_name(&field.type_name) {
                if let Some(anonymous) = factory.cache().symbol(&field.type_name) {
                    self.emit_fields(factory, resolver, &anonymous, offset, depth + 1, writer);
                    continue;
                }
                debug!(
                    field = field.name.as_str(),
                    type_name = field.type_name.as_str(),
                    "anonymous field type not in cache; emitting raw name"
                );
            }
            if !self.compressed() {
                writer.blank_line();
            }
            let type_ref = self.type_ref(resolver, Some(symbol.module().id()), &field.type_name);
            let accessor = accessor_name(&field.name);
            writer.write_line(&format!(
                "public {type_ref} {accessor} {{ get {{ return {reader}<{type_ref}>(\"{}\", {offset}); }} }}",
                field.name
            ));
        }
    }

    fn emit_enum(
        &self,
        factory: &UserTypeFactory,
        id: UserTypeId,
        writer: &mut dyn IndentedWriter,
    ) {
        let user_type = factory.arena().get(id);
        let symbol = user_type
            .symbol
            .as_ref()
            .expect("enum types always have a symbol");
        writer.write_line(&format!("public enum {}", user_type.constructor_name));
        writer.write_line("{");
        writer.indent();
        for value in symbol.enum_values() {
            if value.value.is_empty() {
                writer.write_line(&format!("{},", value.name));
            } else {
                writer.write_line(&format!("{} = {},", value.name, value.value));
            }
        }
        writer.dedent();
        writer.write_line("}");
    }

    fn emit_globals(
        &self,
        factory: &UserTypeFactory,
        resolver: &dyn TypeResolver,
        id: UserTypeId,
        writer: &mut dyn IndentedWriter,
    ) {
        let user_type = factory.arena().get(id);
        let symbol = user_type
            .symbol
            .as_ref()
            .expect("globals aggregates always have a symbol");
        let referrer = Some(symbol.module().id());

        writer.write_line(&format!(
            "public static class {}",
            user_type.constructor_name
        ));
        writer.write_line("{");
        writer.indent();
        let mut first = true;
        for global in symbol.fields() {
            if !first && !self.compressed() {
                writer.blank_line();
            }
            first = false;
            let type_ref = self.type_ref(resolver, referrer, &global.type_name);
            let accessor = accessor_name(&global.name);
            writer.write_line(&format!(
                "public static {type_ref} {accessor} {{ get {{ return GetGlobal<{type_ref}>(\"{}\"); }} }}",
                global.name
            ));
        }
        writer.dedent();
        writer.write_line("}");
    }

    fn emit_template_primary(
        &self,
        factory: &UserTypeFactory,
        id: UserTypeId,
        writer: &mut dyn IndentedWriter,
    ) {
        let arena = factory.arena();
        let user_type = arena.get(id);
        let data = user_type.kind.as_template().expect("template data");
        let symbol = user_type
            .symbol
            .as_ref()
            .expect("template primaries carry their first specialization's symbol");
        let referrer = Some(symbol.module().id());

        let parameters: Vec<String> = (1..=data.arity).map(|i| format!("T{i}")).collect();
        let name_line = if parameters.is_empty() {
            format!("public class {} : UserType", user_type.constructor_name)
        } else {
            format!(
                "public class {}<{}> : UserType",
                user_type.constructor_name,
                parameters.join(", ")
            )
        };
        self.emit_class_header(&name_line, &user_type.constructor_name, writer);

        // The body comes from the first specialization's symbol, with its
        // concrete argument names rebound to the family placeholders.
        let context = data
            .specializations
            .first()
            .and_then(|&spec| arena.get(spec).kind.as_template())
            .map(|spec_data| {
                let mut context = TemplateContext::new();
                context.push(spec_data.bindings.clone());
                context
            })
            .unwrap_or_default();
        let decorated = TemplateUserTypeFactory::new(factory, context);

        for base in symbol.base_classes() {
            if !self.compressed() {
                writer.blank_line();
            }
            let base_ref = self.type_ref(&decorated, referrer, &base.type_name);
            let accessor = accessor_name(&base.type_name);
            writer.write_line(&format!(
                "public {base_ref} {accessor} {{ get {{ return ReadBase<{base_ref}>({}); }} }}",
                base.offset
            ));
        }
        self.emit_fields(factory, &decorated, symbol, 0, 0, writer);

        if !data.specializations.is_empty() {
            if !self.compressed() {
                writer.blank_line();
            }
            writer.write_line("public static readonly string[][] Specializations =");
            writer.write_line("{");
            writer.indent();
            for &spec_id in &data.specializations {
                let spec = arena.get(spec_id);
                let spec_data = spec.kind.as_template().expect("template data");
                let arguments: Vec<String> = if spec_data.resolved_arguments.is_empty() {
                    spec_data
                        .argument_names
                        .iter()
                        .map(|name| format!("\"{name}\""))
                        .collect()
                } else {
                    spec_data
                        .resolved_arguments
                        .iter()
                        .map(|(_, resolved)| {
                            format!("\"{}\"", self.resolved_ref(factory, resolved))
                        })
                        .collect()
                };
                writer.write_line(&format!("new string[] {{ {} }},", arguments.join(", ")));
            }
            writer.dedent();
            writer.write_line("};");
        }

        for &child in &user_type.children {
            if !self.compressed() {
                writer.blank_line();
            }
            self.emit_type(factory, &decorated, child, writer);
        }

        writer.dedent();
        writer.write_line("}");
    }

    /// The emitted spelling of a textual type reference.
    pub fn type_ref(
        &self,
        resolver: &dyn TypeResolver,
        referrer: Option<symgen_symbols::ModuleId>,
        type_name: &str,
    ) -> String {
        match resolver.resolve(referrer, type_name) {
            ResolvedType::User(id) => resolver.arena().full_class_name(id),
            ResolvedType::Placeholder(placeholder) => placeholder,
            ResolvedType::Unresolved(raw) => raw,
        }
    }

    fn resolved_ref(&self, factory: &UserTypeFactory, resolved: &ResolvedType) -> String {
        match resolved {
            ResolvedType::User(id) => factory.arena().full_class_name(*id),
            ResolvedType::Placeholder(placeholder) => placeholder.clone(),
            ResolvedType::Unresolved(raw) => raw.clone(),
        }
    }
}

/// Dotted namespace wrapper path for a top-level type: every ancestor is a
/// namespace node once post-processing ran.
fn namespace_path(factory: &UserTypeFactory, id: UserTypeId) -> String {
    let arena = factory.arena();
    let mut parts = Vec::new();
    let mut current = arena.get(id).declared_in;
    while let Some(node) = current {
        let ancestor = arena.get(node);
        parts.push(ancestor.constructor_name.clone());
        current = ancestor.declared_in;
    }
    if parts.is_empty() {
        let namespace = &arena.get(id).namespace;
        if !namespace.is_empty() {
            parts.push(namespace.clone());
        }
    }
    parts.reverse();
    parts.join(".")
}

/// Accessor identifier for a member or base reference: last scope of the
/// name, sanitized. Falls back to a plain split for names the parser
/// rejects.
fn accessor_name(name: &str) -> String {
    let last = match symgen_names::parse(name) {
        Ok(parsed) => parsed.last_name().to_string(),
        Err(_) => name.rsplit("::").next().unwrap_or(name).to_string(),
    };
    symgen_types::sanitize_identifier(&last)
}

/// Anonymous nested UDT names carry an angle-bracketed last scope, e.g.
/// `Foo::<unnamed-type-u>`.
fn is_anonymous_type_name(name: &str) -> bool {
    name.rsplit("::").next().is_some_and(|last| last.starts_with('<'))
}
