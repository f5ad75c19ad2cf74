//! Opened-module facade.

use std::sync::Arc;

use crate::provider::{ModuleDescriptor, ModuleLoadError, ModuleSource, SymbolProvider};

/// Index of a module in configuration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// An opened module. Created once during the load phase and immutable for
/// the rest of the run.
pub struct Module {
    id: ModuleId,
    name: String,
    namespace: String,
    source: Arc<dyn ModuleSource>,
}

impl Module {
    /// Opens the module through the provider. Failures abort the pipeline.
    pub fn open(
        provider: &dyn SymbolProvider,
        id: ModuleId,
        descriptor: &ModuleDescriptor,
    ) -> Result<Arc<Self>, ModuleLoadError> {
        let source = provider.open_module(descriptor)?;
        Ok(Arc::new(Self {
            id,
            name: descriptor.name.clone(),
            namespace: descriptor.namespace.clone(),
            source,
        }))
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The per-module namespace used for ambiguous deduplicated names.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn source(&self) -> &Arc<dyn ModuleSource> {
        &self.source
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
