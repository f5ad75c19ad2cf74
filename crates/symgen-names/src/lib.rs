//! Qualified C++ type-name parsing for the symgen wrapper generator.
//!
//! This crate provides:
//! - `parse` - turns `A::B<X, Y<Z>>::C` into a tree of nested scopes with
//!   template argument lists
//! - `ParsedName` - family-name erasure, template detection, namespace
//!   extraction
//!
//! The parser is total over the symbol alphabet that survives the pipeline's
//! name filter: operator names, lambda tags, anonymous-namespace markers and
//! `$`-prefixed compiler artifacts are dropped before parsing.

mod parser;

pub use parser::{NameSyntaxError, ParsedName, Scope, parse};

/// Shorthand for `parse(name)?.family_name()`.
pub fn family_name(name: &str) -> Result<String, NameSyntaxError> {
    Ok(parse(name)?.family_name())
}
