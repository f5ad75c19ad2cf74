//! Wrapper source emission for the symgen generator.
//!
//! This crate provides:
//! - `IndentedWriter` / `TextWriter` - the text sink generated code goes to
//! - `CodeEmitter` - renders one UserType (and its nested types) to wrapper
//!   source
//! - `FileNamePlanner` / `GeneratedFile` - per-file output planning with
//!   deterministic collision suffixes
//! - `script` - the script precompiler used by the scripting host

pub mod emitter;
pub mod files;
pub mod script;
pub mod writer;

pub use emitter::CodeEmitter;
pub use files::{EmitError, FileNamePlanner, GeneratedFile, write_files};
pub use script::{PrecompiledScript, ScriptError, precompile};
pub use writer::{IndentedWriter, TextWriter};
