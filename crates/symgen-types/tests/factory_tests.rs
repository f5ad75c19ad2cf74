//! UserType construction and post-processing.

use std::sync::Arc;

use symgen_symbols::testing::{TestModule, TestProvider, TestType};
use symgen_symbols::{
    GlobalCache, Module, ModuleDescriptor, ModuleId, Symbol, SymbolId, deduplicate,
};
use symgen_types::{Transformation, TypeResolver, UserTypeFactory, UserTypeKind};

const COMMON: &str = "CommonTypes";

struct Fixture {
    factory: UserTypeFactory,
    symbols: Vec<Arc<Symbol>>,
}

/// Runs the collect-side of the pipeline for one module: enumerate,
/// deduplicate, fill the cache, materialize every winner.
fn materialize(module: TestModule, transformations: Vec<Transformation>) -> Fixture {
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

    let mut factory = UserTypeFactory::new(cache, transformations);
    // Group winners into template families the way the collect phase does.
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
        factory
            .add_symbols(symbols, COMMON)
            .expect("family materializes");
    }
    for symbol in simple {
        factory.add_symbol(symbol, COMMON).expect("symbol materializes");
    }

    Fixture { factory, symbols }
}

#[test]
fn enum_symbols_become_enum_user_types() {
    let fixture = materialize(
        TestModule::new().with_type(
            TestType::enumeration("Color", 4)
                .value("Red", "0")
                .value("Green", "1"),
        ),
        Vec::new(),
    );
    let symbol = &fixture.symbols[0];
    let id = fixture.factory.get_user_type(symbol).expect("constructed");
    let user_type = fixture.factory.arena().get(id);
    assert!(matches!(user_type.kind, UserTypeKind::Enum));
    assert_eq!(user_type.constructor_name, "Color");
}

#[test]
fn physical_types_note_referenced_namespaces_in_usings() {
    let fixture = materialize(
        TestModule::new().with_type(
            TestType::udt("Foo", 16)
                .field("name", "std::string", 0)
                .field("count", "int", 8),
        ),
        Vec::new(),
    );
    let id = fixture
        .factory
        .get_user_type(&fixture.symbols[0])
        .expect("constructed");
    let user_type = fixture.factory.arena().get(id);
    assert!(matches!(user_type.kind, UserTypeKind::Physical));
    assert!(user_type.usings.contains("std"));
    assert!(user_type.usings.contains("SymGen"));
}

#[test]
fn template_family_groups_specializations_under_one_primary() {
    let fixture = materialize(
        TestModule::new()
            .with_type(TestType::udt("Vec<int>", 8).field("data", "int", 0))
            .with_type(TestType::udt("Vec<float>", 8).field("data", "float", 0))
            .with_type(TestType::udt("Vec<Vec<int>>", 8).field("data", "Vec<int>", 0)),
        Vec::new(),
    );

    let arena = fixture.factory.arena();
    let primaries: Vec<_> = arena
        .iter()
        .filter(|(_, ty)| ty.is_template_primary())
        .collect();
    assert_eq!(primaries.len(), 1);

    let (_, primary) = primaries[0];
    let data = primary.kind.as_template().expect("template data");
    assert_eq!(data.arity, 1);
    assert_eq!(data.specializations.len(), 3);
    assert_eq!(primary.constructor_name, "Vec");

    // Template arity: every specialization matches the primary's count.
    for &spec_id in &data.specializations {
        let spec = arena.get(spec_id);
        let spec_data = spec.kind.as_template().expect("template data");
        assert_eq!(spec_data.argument_names.len(), data.arity);
        assert_eq!(spec.constructor_name, "Vec_1");
    }
}

#[test]
fn process_types_builds_the_declaration_tree() {
    let fixture = {
        let mut fixture = materialize(
            TestModule::new()
                .with_type(TestType::udt("Outer", 8))
                .with_type(TestType::udt("Outer::Inner", 4))
                .with_type(TestType::udt("ns::Standalone", 4)),
            Vec::new(),
        );
        fixture.factory.process_types();
        fixture
    };
    let factory = &fixture.factory;
    let arena = factory.arena();

    let outer = factory.get_user_type(&fixture.symbols[0]).expect("outer");
    let inner = factory.get_user_type(&fixture.symbols[1]).expect("inner");
    let standalone = factory.get_user_type(&fixture.symbols[2]).expect("standalone");

    // Inner nests under Outer, which nests under the namespace root.
    assert_eq!(arena.get(inner).declared_in, Some(outer));
    assert!(arena.get(outer).children.contains(&inner));
    assert_eq!(arena.full_class_name(inner), "CommonTypes.Outer.Inner");
    assert!(!arena.has_only_namespace_ancestors(inner));
    assert!(arena.has_only_namespace_ancestors(outer));

    // `ns` has no generated type, so a namespace container is synthesized.
    let parent = arena.get(standalone).declared_in.expect("parent");
    assert!(arena.get(parent).kind.is_namespace());
    assert_eq!(arena.get(parent).constructor_name, "ns");
    assert_eq!(arena.full_class_name(standalone), "CommonTypes.ns.Standalone");
    assert!(arena.has_only_namespace_ancestors(standalone));

    assert_eq!(factory.namespace_roots().len(), 1);
}

#[test]
fn transformations_rewrite_unresolved_names() {
    let fixture = materialize(
        TestModule::new().with_type(TestType::udt("Foo", 8)),
        vec![Transformation::new("unsigned __int64", "ulong")],
    );
    let resolved = fixture.factory.resolve(None, "unsigned __int64");
    assert_eq!(
        resolved,
        symgen_types::ResolvedType::Unresolved("ulong".to_string())
    );
}

#[test]
fn textual_lookup_resolves_through_the_cache() {
    let fixture = materialize(
        TestModule::new()
            .with_type(TestType::udt("Foo", 8))
            .with_type(TestType::udt("Bar", 4).field("foo", "Foo", 0)),
        Vec::new(),
    );
    let foo = fixture.factory.get_user_type(&fixture.symbols[0]).expect("foo");
    let resolved = fixture.factory.resolve(Some(ModuleId(0)), "Foo");
    assert_eq!(resolved, symgen_types::ResolvedType::User(foo));
}
