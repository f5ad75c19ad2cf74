//! The generation pipeline.
//!
//! Phases, in order: load modules, enumerate symbols, deduplicate, fill the
//! global cache, collect types, materialize UserTypes, link template
//! arguments, post-process the graph, emit. Load, enumerate, collect and
//! emit fan out over a rayon pool; everything else runs on the coordinator
//! over the accumulated state.

use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info_span};

use symgen_common::{
    BufferPool, Diagnostic, DiagnosticSink, GenerationFlags, PipelinePhase,
};
use symgen_emitter::{CodeEmitter, EmitError, FileNamePlanner, GeneratedFile, TextWriter};
use symgen_symbols::{
    GlobalCache, Module, ModuleLoadError, RawSymbol, Symbol, SymbolId, SymbolKey, SymbolProvider,
    SymbolTag, deduplicate,
};
use symgen_types::{UserTypeFactory, UserTypeId};

use crate::config::Configuration;

/// A fatal pipeline failure. In-flight parallel work runs to completion but
/// its output is discarded; partial artifacts already on disk are kept.
#[derive(Debug)]
pub enum PipelineError {
    ModuleLoad(ModuleLoadError),
    Emit(EmitError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModuleLoad(error) => error.fmt(f),
            Self::Emit(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ModuleLoad(error) => Some(error),
            Self::Emit(error) => Some(error),
        }
    }
}

impl From<ModuleLoadError> for PipelineError {
    fn from(error: ModuleLoadError) -> Self {
        Self::ModuleLoad(error)
    }
}

impl From<EmitError> for PipelineError {
    fn from(error: EmitError) -> Self {
        Self::Emit(error)
    }
}

/// Everything the pipeline produced, handed back to the generator entry
/// point for persistence and the optional compile step.
#[derive(Debug)]
pub struct PipelineOutput {
    pub factory: UserTypeFactory,
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the whole pipeline in memory.
pub fn run(
    config: &Configuration,
    provider: &dyn SymbolProvider,
    flags: GenerationFlags,
) -> Result<PipelineOutput, PipelineError> {
    let sink = DiagnosticSink::new();

    let modules = load_modules(config, provider)?;
    let symbols = enumerate_symbols(config, &modules, &sink);
    debug!(modules = modules.len(), symbols = symbols.len(), "enumeration complete");

    let dedup = {
        let _span = info_span!("deduplicate", symbols = symbols.len()).entered();
        deduplicate(&symbols, &config.common_types_namespace)
    };

    let cache = Arc::new(GlobalCache::new());
    cache.update(dedup.cache_entries());

    let (families, simple) = collect_types(&dedup, &sink);
    let mut factory = UserTypeFactory::new(cache, config.transformations());
    materialize(
        &mut factory,
        &dedup,
        families,
        simple,
        &modules,
        symbols.len() as u32,
        &sink,
    );

    {
        let _span = info_span!("link_templates").entered();
        factory.update_template_arguments(&sink);
    }
    {
        let _span = info_span!("post_process").entered();
        factory.process_types();
    }

    let files = emit(&factory, flags);

    Ok(PipelineOutput {
        factory,
        files,
        diagnostics: sink.take_all(),
    })
}

/// P1: open every configured module, in parallel. Any failure aborts.
fn load_modules(
    config: &Configuration,
    provider: &dyn SymbolProvider,
) -> Result<Vec<Arc<Module>>, ModuleLoadError> {
    let _span = info_span!("load_modules", count = config.modules.len()).entered();
    config
        .module_descriptors()
        .par_iter()
        .enumerate()
        .map(|(index, descriptor)| {
            Module::open(provider, symgen_symbols::ModuleId(index as u32), descriptor)
        })
        .collect()
}

/// P2: enumerate types per module in parallel, then interleave the module
/// lists round-robin into one global list on the coordinator.
///
/// The interleaved order is the deduplication tie-break, so symbol ids are
/// assigned here, in interleaved order.
fn enumerate_symbols(
    config: &Configuration,
    modules: &[Arc<Module>],
    sink: &DiagnosticSink,
) -> Vec<Arc<Symbol>> {
    let _span = info_span!("enumerate_symbols").entered();
    let per_module: Vec<Vec<RawSymbol>> = modules
        .par_iter()
        .map(|module| {
            let source = module.source();
            let mut seen: FxHashSet<SymbolKey> = FxHashSet::default();
            let mut list = Vec::new();
            for pattern in &config.types {
                let matched = source.find_global_type_wildcard(pattern);
                if matched.is_empty() {
                    sink.push(
                        Diagnostic::warning(
                            PipelinePhase::EnumerateSymbols,
                            format!("type pattern `{pattern}` matched no symbols"),
                        )
                        .with_module(module.name()),
                    );
                }
                for raw in matched {
                    if seen.insert(raw.key) {
                        list.push(raw);
                    }
                }
            }
            for raw in source.all_types() {
                if seen.insert(raw.key) {
                    list.push(raw);
                }
            }
            list
        })
        .collect();

    let longest = per_module.iter().map(Vec::len).max().unwrap_or(0);
    let mut symbols = Vec::with_capacity(per_module.iter().map(Vec::len).sum());
    let mut next_id = 0u32;
    for position in 0..longest {
        for (module_index, list) in per_module.iter().enumerate() {
            if let Some(raw) = list.get(position) {
                symbols.push(Symbol::new(
                    SymbolId(next_id),
                    raw.clone(),
                    modules[module_index].clone(),
                ));
                next_id += 1;
            }
        }
    }
    symbols
}

/// Symbols the generator never wraps: compiler artifacts, anonymous
/// namespaces, lambdas, references and unnamed local types.
pub(crate) fn is_filtered(name: &str) -> bool {
    name.starts_with('$')
        || name.starts_with("__vc_attributes")
        || name.contains('`')
        || name.contains('&')
        || last_scope(name).starts_with('<')
}

/// The final `::`-separated scope, ignoring separators nested in template
/// argument lists.
pub(crate) fn last_scope(name: &str) -> &str {
    let bytes = name.as_bytes();
    let mut depth = 0usize;
    let mut last_start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                last_start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    &name[last_start.min(bytes.len())..]
}

type FamilyKey = (String, String);

/// P5: filter the dedup winners and split them into template families and
/// simple symbols, in parallel. The family accumulator is a sharded
/// concurrent map; member lists are re-sorted afterwards so the output does
/// not depend on worker scheduling.
fn collect_types(
    dedup: &symgen_symbols::DedupResult,
    sink: &DiagnosticSink,
) -> (Vec<(FamilyKey, Vec<Arc<Symbol>>)>, Vec<Arc<Symbol>>) {
    let _span = info_span!("collect_types").entered();
    let winners: Vec<&Arc<Symbol>> = dedup.winners().collect();
    let families: DashMap<FamilyKey, Vec<Arc<Symbol>>> = DashMap::new();

    let simple: Vec<Arc<Symbol>> = winners
        .par_iter()
        .filter_map(|symbol| {
            if is_filtered(symbol.name()) {
                return None;
            }
            if symbol.tag() != SymbolTag::Udt {
                return Some(Arc::clone(symbol));
            }
            match symgen_names::parse(symbol.name()) {
                Ok(parsed) if parsed.is_template() => {
                    let namespace = dedup.namespace_assignment[&symbol.id()].clone();
                    families
                        .entry((namespace, parsed.family_name()))
                        .or_default()
                        .push(Arc::clone(symbol));
                    None
                }
                Ok(_) => Some(Arc::clone(symbol)),
                Err(error) => {
                    sink.push(
                        Diagnostic::warning(
                            PipelinePhase::CollectTypes,
                            format!("unparsable symbol name skipped: {error}"),
                        )
                        .with_module(symbol.module().name())
                        .with_symbol(symbol.name()),
                    );
                    None
                }
            }
        })
        .collect();

    // Sharded accumulation loses insertion order; restore it from symbol
    // ids, which are the interleaved enumeration order.
    let mut families: Vec<(FamilyKey, Vec<Arc<Symbol>>)> = families
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by_key(|symbol| symbol.id());
            (key, members)
        })
        .collect();
    families.sort_by_key(|(_, members)| members[0].id());

    (families, simple)
}

/// P6: one `add_symbols` per template family, one `add_symbol` per simple
/// symbol, one globals aggregate per module. Single-threaded.
fn materialize(
    factory: &mut UserTypeFactory,
    dedup: &symgen_symbols::DedupResult,
    families: Vec<(FamilyKey, Vec<Arc<Symbol>>)>,
    simple: Vec<Arc<Symbol>>,
    modules: &[Arc<Module>],
    mut next_symbol_id: u32,
    sink: &DiagnosticSink,
) {
    let _span = info_span!("materialize", families = families.len(), simple = simple.len())
        .entered();
    for ((namespace, _family), members) in families {
        if let Err(error) = factory.add_symbols(&members, &namespace) {
            sink.push(
                Diagnostic::warning(
                    PipelinePhase::CollectTypes,
                    format!("template family skipped: {error}"),
                )
                .with_symbol(members[0].name()),
            );
        }
    }
    for symbol in simple {
        let namespace = dedup.namespace_assignment[&symbol.id()].clone();
        if let Err(error) = factory.add_symbol(Arc::clone(&symbol), &namespace) {
            sink.push(
                Diagnostic::warning(
                    PipelinePhase::CollectTypes,
                    format!("symbol skipped: {error}"),
                )
                .with_module(symbol.module().name())
                .with_symbol(symbol.name()),
            );
        }
    }
    for module in modules {
        let raw = module.source().global_scope();
        let symbol = Symbol::new(SymbolId(next_symbol_id), raw, Arc::clone(module));
        next_symbol_id += 1;
        let namespace = module.namespace().to_string();
        if let Err(error) = factory.add_symbol(symbol, &namespace) {
            sink.push(
                Diagnostic::warning(
                    PipelinePhase::CollectTypes,
                    format!("module globals skipped: {error}"),
                )
                .with_module(module.name()),
            );
        }
    }
}

/// P9: render output, either one file per top-level type or a single
/// concatenated file. File names are reserved on the coordinator in type
/// order, so collision suffixes are reproducible; rendering fans out.
fn emit(factory: &UserTypeFactory, flags: GenerationFlags) -> Vec<GeneratedFile> {
    let _span = info_span!("emit").entered();
    let emitter = CodeEmitter::new(flags);

    if flags.contains(GenerationFlags::SINGLE_FILE_EXPORT) {
        let mut writer = TextWriter::new();
        emitter.render_single_file(factory, &mut writer);
        return vec![GeneratedFile {
            file_name: "GeneratedTypes.cs".to_string(),
            content: writer.into_buffer(),
        }];
    }

    let arena = factory.arena();
    let mut planner = FileNamePlanner::new();
    let targets: Vec<(UserTypeId, String)> = arena
        .iter()
        .filter(|(id, user_type)| {
            if user_type.kind.is_namespace() {
                return false;
            }
            if let Some(symbol) = &user_type.symbol {
                if symbol.tag() == SymbolTag::BaseType {
                    return false;
                }
            }
            // Nested types are rendered inline by their parent.
            arena.has_only_namespace_ancestors(*id)
        })
        .map(|(id, _)| (id, planner.reserve(&arena.full_class_name(id))))
        .collect();

    let buffers = BufferPool::strings();
    targets
        .par_iter()
        .map(|(id, file_name)| {
            let mut writer = TextWriter::with_buffer(buffers.take_cleared());
            emitter.render_file(factory, *id, &mut writer);
            let content = writer.as_str().to_string();
            buffers.put(writer.into_buffer());
            GeneratedFile {
                file_name: file_name.clone(),
                content,
            }
        })
        .collect()
}
