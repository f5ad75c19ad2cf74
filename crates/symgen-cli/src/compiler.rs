//! The downstream source-level compiler boundary.
//!
//! The generator core only drives the interface; a concrete compiler is
//! supplied by the embedding application.

use std::path::PathBuf;

/// Diagnostic lines reported from a failed compile before truncation.
pub const MAX_REPORTED_LINES: usize = 1000;

#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Generated files plus any configured included files.
    pub sources: Vec<PathBuf>,
    pub references: Vec<String>,
    pub output_path: PathBuf,
    pub disable_pdb_generation: bool,
}

#[derive(Debug, Clone)]
pub struct CompileOutcome {
    pub ok: bool,
    pub diagnostics: Vec<String>,
}

pub trait Compiler {
    fn compile(&self, request: &CompileRequest) -> CompileOutcome;
}
