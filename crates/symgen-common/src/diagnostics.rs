//! Structured diagnostics for the generation pipeline.
//!
//! Non-fatal problems (an empty wildcard match, an unparsable symbol name, an
//! unresolved template argument) are routed here instead of unwinding the
//! pipeline. Every diagnostic carries the phase it was raised in plus the
//! module and symbol it concerns, so the reporter can group output usefully.

use std::sync::Mutex;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

/// Pipeline phase a diagnostic originated from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PipelinePhase {
    LoadModules,
    EnumerateSymbols,
    Deduplicate,
    CollectTypes,
    LinkTemplates,
    PostProcess,
    Emit,
    Compile,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LoadModules => "load-modules",
            Self::EnumerateSymbols => "enumerate-symbols",
            Self::Deduplicate => "deduplicate",
            Self::CollectTypes => "collect-types",
            Self::LinkTemplates => "link-templates",
            Self::PostProcess => "post-process",
            Self::Emit => "emit",
            Self::Compile => "compile",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub phase: PipelinePhase,
    /// Module the diagnostic concerns, if any.
    pub module: Option<String>,
    /// Symbol name the diagnostic concerns, if any.
    pub symbol: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(phase: PipelinePhase, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            phase,
            module: None,
            symbol: None,
            message: message.into(),
        }
    }

    pub fn error(phase: PipelinePhase, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            phase,
            module: None,
            symbol: None,
            message: message.into(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.phase)?;
        if let Some(module) = &self.module {
            write!(f, " module `{module}`")?;
        }
        if let Some(symbol) = &self.symbol {
            write!(f, " symbol `{symbol}`")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Collector for pipeline diagnostics. Parallel phases push from worker
/// threads, so the backing store sits behind a mutex.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .expect("diagnostic sink lock poisoned")
            .push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .lock()
            .expect("diagnostic sink lock poisoned")
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    /// Drains all collected diagnostics in insertion order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().expect("diagnostic sink lock poisoned"))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("diagnostic sink lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
