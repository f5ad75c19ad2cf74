//! Template-argument rebinding.
//!
//! While a template body is being emitted, type names that textually match
//! one of the enclosing family's arguments must emit as the argument
//! placeholder (`T1`) rather than the concrete type. The binding is a stack
//! of argument maps threaded through a factory decorator, so nested template
//! emission sees inner bindings first.

use symgen_symbols::ModuleId;

use crate::arena::UserTypeArena;
use crate::factory::UserTypeFactory;
use crate::user_type::ResolvedType;

/// C++ alias pairs tolerated when matching argument names. Tried only when
/// the literal name misses; matching is symmetric.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("wchar_t", "unsigned short"),
    ("long long", "__int64"),
    ("unsigned long long", "unsigned __int64"),
];

fn alias_of(name: &str) -> Option<&'static str> {
    TYPE_ALIASES.iter().find_map(|&(a, b)| {
        if name == a {
            Some(b)
        } else if name == b {
            Some(a)
        } else {
            None
        }
    })
}

/// A stack of `argument name -> placeholder` frames, innermost last.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    frames: Vec<indexmap::IndexMap<String, String>>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: indexmap::IndexMap<String, String>) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// The placeholder bound to an argument name, consulting alias pairs
    /// when the literal name misses.
    pub fn try_get_argument(&self, name: &str) -> Option<&str> {
        for frame in self.frames.iter().rev() {
            if let Some(placeholder) = frame.get(name) {
                return Some(placeholder);
            }
            if let Some(alias) = alias_of(name) {
                if let Some(placeholder) = frame.get(alias) {
                    return Some(placeholder);
                }
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Type-name resolution as seen by the emitter: the base factory resolves
/// against the global cache; the template decorator intercepts argument
/// names first.
pub trait TypeResolver {
    fn arena(&self) -> &UserTypeArena;

    /// Resolves a textual type reference from code declared in `referrer`.
    fn resolve(&self, referrer: Option<ModuleId>, type_name: &str) -> ResolvedType;
}

/// Decorator that rebinds template-argument names to placeholders for the
/// template body currently being emitted.
pub struct TemplateUserTypeFactory<'f> {
    base: &'f UserTypeFactory,
    context: TemplateContext,
}

impl<'f> TemplateUserTypeFactory<'f> {
    pub fn new(base: &'f UserTypeFactory, context: TemplateContext) -> Self {
        Self { base, context }
    }

    pub fn context(&self) -> &TemplateContext {
        &self.context
    }
}

impl TypeResolver for TemplateUserTypeFactory<'_> {
    fn arena(&self) -> &UserTypeArena {
        self.base.arena()
    }

    fn resolve(&self, referrer: Option<ModuleId>, type_name: &str) -> ResolvedType {
        self.base.resolve_with_context(referrer, type_name, Some(&self.context))
    }
}
