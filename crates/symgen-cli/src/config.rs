//! The generation configuration record.
//!
//! Configuration arrives as JSON; the XML project format of older toolchains
//! is handled by an external loader and is out of scope here.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use symgen_common::GenerationFlags;
use symgen_symbols::ModuleDescriptor;
use symgen_types::Transformation;

#[derive(Debug)]
pub enum ConfigurationError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    MissingIncludedFile {
        path: PathBuf,
    },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read configuration `{}`: {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "invalid configuration `{}`: {}", path.display(), source)
            }
            Self::MissingIncludedFile { path } => {
                write!(f, "included file `{}` does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::MissingIncludedFile { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleEntry {
    pub path: PathBuf,
    pub name: String,
    /// Namespace for this module's ambiguous types. Defaults to the module
    /// name.
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransformationEntry {
    pub pattern: String,
    pub replacement: String,
}

fn default_common_namespace() -> String {
    "CommonTypes".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Configuration {
    /// Modules to generate wrappers for.
    pub modules: Vec<ModuleEntry>,
    /// Wildcard patterns of type names to include.
    pub types: Vec<String>,
    /// Ordered type-name rewrites; first match wins.
    pub transformations: Vec<TransformationEntry>,
    /// Namespace for unambiguous deduplicated types.
    pub common_types_namespace: String,
    /// Named generation flags; unrecognized names are preserved and warned
    /// about, never rejected.
    pub generation_flags: Vec<String>,
    /// Output artifact name; empty skips the compile step.
    pub generated_assembly_name: String,
    /// Extra sources co-compiled with the generated code.
    pub included_files: Vec<PathBuf>,
    /// Extra references passed to the compiler.
    pub referenced_assemblies: Vec<String>,
    /// Optional manifest listing every emitted file.
    pub generated_props_file_name: String,
    /// Suppress debug info in the compile step.
    pub disable_pdb_generation: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            types: Vec::new(),
            transformations: Vec::new(),
            common_types_namespace: default_common_namespace(),
            generation_flags: Vec::new(),
            generated_assembly_name: String::new(),
            included_files: Vec::new(),
            referenced_assemblies: Vec::new(),
            generated_props_file_name: String::new(),
            disable_pdb_generation: false,
        }
    }
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigurationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Fail-fast validation: every included file must exist.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for included in &self.included_files {
            if !included.is_file() {
                return Err(ConfigurationError::MissingIncludedFile {
                    path: included.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn flags(&self) -> GenerationFlags {
        let (flags, unknown) =
            GenerationFlags::from_names(self.generation_flags.iter().map(String::as_str));
        for name in unknown {
            warn!(flag = name, "unrecognized generation flag preserved");
        }
        flags
    }

    pub fn transformations(&self) -> Vec<Transformation> {
        self.transformations
            .iter()
            .map(|entry| Transformation::new(entry.pattern.clone(), entry.replacement.clone()))
            .collect()
    }

    pub fn module_descriptors(&self) -> Vec<ModuleDescriptor> {
        self.modules
            .iter()
            .map(|entry| ModuleDescriptor {
                path: entry.path.clone(),
                name: entry.name.clone(),
                namespace: if entry.namespace.is_empty() {
                    entry.name.clone()
                } else {
                    entry.namespace.clone()
                },
            })
            .collect()
    }
}
