//! Generation entry point: pipeline, persistence, manifest and the
//! optional compile step.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use symgen_common::{Diagnostic, GenerationFlags, PipelinePhase};
use symgen_emitter::{EmitError, GeneratedFile, write_files};
use symgen_symbols::SymbolProvider;

use crate::compiler::{CompileRequest, Compiler, MAX_REPORTED_LINES};
use crate::config::Configuration;
use crate::driver::{self, PipelineError};

#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Where generated files land; `None` keeps everything in memory.
    pub out_dir: Option<PathBuf>,
    /// Flags ORed on top of the configured ones (e.g. from CLI switches).
    pub extra_flags: GenerationFlags,
}

pub struct GenerationOutput {
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
    /// Generated types, namespace containers included.
    pub user_types: usize,
}

pub struct Generator<'a> {
    config: &'a Configuration,
    provider: &'a dyn SymbolProvider,
    compiler: Option<&'a dyn Compiler>,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a Configuration, provider: &'a dyn SymbolProvider) -> Self {
        Self {
            config,
            provider,
            compiler: None,
        }
    }

    pub fn with_compiler(mut self, compiler: &'a dyn Compiler) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn generate(&self, options: &GenerationOptions) -> Result<GenerationOutput, PipelineError> {
        let flags = self.config.flags() | options.extra_flags;
        let output = driver::run(self.config, self.provider, flags)?;
        let mut diagnostics = output.diagnostics;
        let user_types = output.factory.arena().len();
        debug!(files = output.files.len(), user_types, "pipeline complete");

        if let Some(out_dir) = &options.out_dir {
            write_files(&output.files, out_dir)?;
            if !self.config.generated_props_file_name.is_empty() {
                self.write_props_manifest(&output.files, out_dir)?;
            }
        }

        if !self.config.generated_assembly_name.is_empty() {
            self.compile_step(&output.files, options.out_dir.as_deref(), &mut diagnostics);
        }

        Ok(GenerationOutput {
            files: output.files,
            diagnostics,
            user_types,
        })
    }

    /// MSBuild-style manifest listing every emitted file.
    fn write_props_manifest(
        &self,
        files: &[GeneratedFile],
        out_dir: &Path,
    ) -> Result<(), EmitError> {
        let mut content = String::from("<Project>\n  <ItemGroup>\n");
        for file in files {
            content.push_str(&format!("    <Compile Include=\"{}\" />\n", file.file_name));
        }
        content.push_str("  </ItemGroup>\n</Project>\n");
        let manifest = GeneratedFile {
            file_name: self.config.generated_props_file_name.clone(),
            content,
        };
        write_files(std::slice::from_ref(&manifest), out_dir)
    }

    fn compile_step(
        &self,
        files: &[GeneratedFile],
        out_dir: Option<&Path>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(compiler) = self.compiler else {
            warn!("assembly name configured but no compiler is attached; skipping compile");
            diagnostics.push(Diagnostic::warning(
                PipelinePhase::Compile,
                "no compiler attached; compile step skipped",
            ));
            return;
        };

        let base = out_dir.unwrap_or_else(|| Path::new("."));
        let mut sources: Vec<PathBuf> =
            files.iter().map(|file| base.join(&file.file_name)).collect();
        sources.extend(self.config.included_files.iter().cloned());

        let request = CompileRequest {
            sources,
            references: self.config.referenced_assemblies.clone(),
            output_path: base.join(&self.config.generated_assembly_name),
            disable_pdb_generation: self.config.disable_pdb_generation,
        };
        let outcome = compiler.compile(&request);
        if !outcome.ok {
            let mut detail: Vec<&str> = outcome
                .diagnostics
                .iter()
                .map(String::as_str)
                .collect();
            let truncated = detail.len() > MAX_REPORTED_LINES;
            detail.truncate(MAX_REPORTED_LINES);
            let mut message = format!(
                "compilation of `{}` failed:\n{}",
                self.config.generated_assembly_name,
                detail.join("\n")
            );
            if truncated {
                message.push_str("\n(output truncated)");
            }
            diagnostics.push(Diagnostic::error(PipelinePhase::Compile, message));
        }
    }
}
