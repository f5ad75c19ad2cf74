//! Common types and utilities for the symgen wrapper generator.
//!
//! This crate provides:
//! - `Diagnostic` / `DiagnosticSink` - the non-fatal error channel shared by
//!   every pipeline phase
//! - `GenerationFlags` - the output-shaping flag set from the configuration
//! - `BufferPool` - per-worker scratch buffer reuse

pub mod diagnostics;
pub mod flags;
pub mod pool;

pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSink, PipelinePhase};
pub use flags::GenerationFlags;
pub use pool::BufferPool;
