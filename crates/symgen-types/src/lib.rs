//! UserType graph and construction factory for the symgen wrapper generator.
//!
//! This crate provides:
//! - `UserTypeArena` / `UserType` - the generated-type graph, one node per
//!   emitted wrapper, with integer parent links
//! - `UserTypeFactory` - builds UserTypes from deduplicated symbols, applies
//!   configured type-name transformations, and resolves textual type
//!   references through the global cache
//! - `TemplateUserTypeFactory` - the decorator that rebinds type names to
//!   template-argument placeholders inside a template body

pub mod arena;
pub mod factory;
pub mod template;
pub mod transform;
pub mod user_type;

pub use arena::{UserTypeArena, UserTypeId};
pub use factory::UserTypeFactory;
pub use template::{TemplateContext, TemplateUserTypeFactory, TypeResolver};
pub use transform::Transformation;
pub use user_type::{
    DEFAULT_USING, ResolvedType, TemplateData, UserType, UserTypeKind, sanitize_identifier,
};
