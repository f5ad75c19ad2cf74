//! Template-argument linking and placeholder rebinding.

use std::sync::Arc;

use symgen_common::DiagnosticSink;
use symgen_symbols::testing::{TestModule, TestProvider, TestType};
use symgen_symbols::{
    GlobalCache, Module, ModuleDescriptor, ModuleId, Symbol, SymbolId, deduplicate,
};
use symgen_types::{
    ResolvedType, TemplateContext, TemplateUserTypeFactory, TypeResolver, UserTypeFactory,
};

const COMMON: &str = "CommonTypes";

fn materialize(module: TestModule) -> (UserTypeFactory, Vec<Arc<Symbol>>) {
    let provider = TestProvider::new().with_module("m1", module);
    let module = Module::open(
        &provider,
        ModuleId(0),
        &ModuleDescriptor {
            path: "m1.pdb".into(),
            name: "m1".to_string(),
            namespace: "M1".to_string(),
        },
    )
    .expect("test module opens");

    let symbols: Vec<Arc<Symbol>> = module
        .source()
        .all_types()
        .into_iter()
        .enumerate()
        .map(|(i, raw)| Symbol::new(SymbolId(i as u32), raw, module.clone()))
        .collect();

    let result = deduplicate(&symbols, COMMON);
    let cache = Arc::new(GlobalCache::new());
    cache.update(result.cache_entries());

    let mut factory = UserTypeFactory::new(cache, Vec::new());
    let mut families: indexmap::IndexMap<String, Vec<Arc<Symbol>>> = indexmap::IndexMap::new();
    let mut simple = Vec::new();
    for symbol in result.winners() {
        let parsed = symgen_names::parse(symbol.name()).expect("test names parse");
        if parsed.is_template() {
            families
                .entry(parsed.family_name())
                .or_default()
                .push(symbol.clone());
        } else {
            simple.push(symbol.clone());
        }
    }
    for symbols in families.values() {
        factory.add_symbols(symbols, COMMON).expect("family materializes");
    }
    for symbol in simple {
        factory.add_symbol(symbol, COMMON).expect("symbol materializes");
    }
    (factory, symbols)
}

#[test]
fn field_matching_an_alias_of_the_argument_emits_as_placeholder() {
    // The template binds T1 = wchar_t; a field typed `unsigned short` must
    // resolve to the placeholder inside the template body.
    let (factory, symbols) = materialize(
        TestModule::new()
            .with_type(TestType::udt("Str<wchar_t>", 16).field("buffer", "unsigned short", 0)),
    );
    let spec = factory.get_user_type(&symbols[0]).expect("specialization");
    let data = factory
        .arena()
        .get(spec)
        .kind
        .as_template()
        .expect("template data")
        .clone();

    let mut context = TemplateContext::new();
    context.push(data.bindings.clone());
    let decorated = TemplateUserTypeFactory::new(&factory, context);

    assert_eq!(
        decorated.resolve(Some(ModuleId(0)), "unsigned short"),
        ResolvedType::Placeholder("T1".to_string())
    );
    assert_eq!(
        decorated.resolve(Some(ModuleId(0)), "wchar_t"),
        ResolvedType::Placeholder("T1".to_string())
    );
}

#[test]
fn link_resolves_arguments_that_have_generated_types() {
    let (factory, symbols) = {
        let (mut factory, symbols) = materialize(
            TestModule::new()
                .with_type(TestType::udt("Foo", 8))
                .with_type(TestType::udt("Vec<Foo>", 16).field("item", "Foo", 0)),
        );
        let sink = DiagnosticSink::new();
        factory.update_template_arguments(&sink);
        (factory, symbols)
    };

    let foo = factory.get_user_type(&symbols[0]).expect("foo");
    let spec = factory.get_user_type(&symbols[1]).expect("specialization");
    let data = factory
        .arena()
        .get(spec)
        .kind
        .as_template()
        .expect("template data");

    assert_eq!(data.resolved_arguments.len(), 1);
    assert_eq!(data.resolved_arguments[0].0, "Foo");
    assert_eq!(data.resolved_arguments[0].1, ResolvedType::User(foo));
}

#[test]
fn unresolved_arguments_fall_back_to_raw_names() {
    let (factory, symbols) = {
        let (mut factory, symbols) =
            materialize(TestModule::new().with_type(TestType::udt("Vec<Mystery>", 16)));
        let sink = DiagnosticSink::new();
        factory.update_template_arguments(&sink);
        (factory, symbols)
    };

    let spec = factory.get_user_type(&symbols[0]).expect("specialization");
    let data = factory
        .arena()
        .get(spec)
        .kind
        .as_template()
        .expect("template data");
    assert_eq!(
        data.resolved_arguments[0].1,
        ResolvedType::Unresolved("Mystery".to_string())
    );
}

#[test]
fn repeated_argument_types_bind_to_their_first_placeholder() {
    let (factory, symbols) = materialize(
        TestModule::new().with_type(TestType::udt("Pair<int,int>", 8)),
    );
    let spec = factory.get_user_type(&symbols[0]).expect("specialization");
    let data = factory
        .arena()
        .get(spec)
        .kind
        .as_template()
        .expect("template data");

    assert_eq!(data.argument_names, vec!["int", "int"]);
    assert_eq!(data.arity, 2);
    assert_eq!(data.bindings.get("int").map(String::as_str), Some("T1"));
}

#[test]
fn specializations_parent_under_their_primary_after_post_processing() {
    let (factory, symbols) = {
        let (mut factory, symbols) = materialize(
            TestModule::new()
                .with_type(TestType::udt("Vec<int>", 8))
                .with_type(TestType::udt("Vec<float>", 8)),
        );
        factory.process_types();
        (factory, symbols)
    };

    let spec = factory.get_user_type(&symbols[0]).expect("specialization");
    let arena = factory.arena();
    let primary = arena
        .get(spec)
        .kind
        .as_template()
        .expect("template data")
        .primary
        .expect("specializations have a primary");
    assert_eq!(arena.get(spec).declared_in, Some(primary));
    assert!(arena.get(primary).is_template_primary());
    // Nested under a class, so per-file emission skips it.
    assert!(!arena.has_only_namespace_ancestors(spec));
}
