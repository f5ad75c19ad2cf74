//! Wrapper emission output checks.

use std::sync::Arc;

use symgen_common::GenerationFlags;
use symgen_emitter::{CodeEmitter, TextWriter};
use symgen_symbols::testing::{TestModule, TestProvider, TestType};
use symgen_symbols::{
    GlobalCache, Module, ModuleDescriptor, ModuleId, Symbol, SymbolId, deduplicate,
};
use symgen_types::UserTypeFactory;

const COMMON: &str = "CommonTypes";

struct Fixture {
    factory: UserTypeFactory,
    symbols: Vec<Arc<Symbol>>,
}

fn materialize(module: TestModule) -> Fixture {
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
    let mut families: Vec<(String, Vec<Arc<Symbol>>)> = Vec::new();
    let mut simple = Vec::new();
    for symbol in result.winners() {
        let parsed = symgen_names::parse(symbol.name()).expect("test names parse");
        if parsed.is_template() {
            let family = parsed.family_name();
            match families.iter_mut().find(|(key, _)| *key == family) {
                Some((_, members)) => members.push(symbol.clone()),
                None => families.push((family, vec![symbol.clone()])),
            }
        } else {
            simple.push(symbol.clone());
        }
    }
    for (_, symbols) in &families {
        factory.add_symbols(symbols, COMMON).expect("family materializes");
    }
    for symbol in simple {
        factory.add_symbol(symbol, COMMON).expect("symbol materializes");
    }
    let sink = symgen_common::DiagnosticSink::new();
    factory.update_template_arguments(&sink);
    factory.process_types();
    Fixture { factory, symbols }
}

fn render(fixture: &Fixture, index: usize, flags: GenerationFlags) -> String {
    let id = fixture
        .factory
        .get_user_type(&fixture.symbols[index])
        .expect("constructed");
    let emitter = CodeEmitter::new(flags);
    let mut writer = TextWriter::new();
    emitter.render_file(&fixture.factory, id, &mut writer);
    writer.into_buffer()
}

#[test]
fn physical_type_emits_typed_field_accessors() {
    let fixture = materialize(
        TestModule::new().with_type(TestType::udt("Foo", 4).field("x", "int", 0)),
    );
    let output = render(&fixture, 0, GenerationFlags::empty());

    assert!(output.contains("using SymGen;"));
    assert!(output.contains("namespace CommonTypes"));
    assert!(output.contains("public class Foo : UserType"));
    assert!(output.contains("public Foo(Variable variable)"));
    assert!(output.contains("public int x { get { return GetField<int>(\"x\", 0); } }"));
}

#[test]
fn base_classes_emit_compositional_accessors_in_order() {
    let fixture = materialize(
        TestModule::new()
            .with_type(TestType::udt("Base", 4).field("b", "int", 0))
            .with_type(
                TestType::udt("Derived", 12)
                    .base("Base", 0)
                    .field("d", "int", 4),
            ),
    );
    let output = render(&fixture, 1, GenerationFlags::empty());

    assert!(output.contains(
        "public CommonTypes.Base Base { get { return ReadBase<CommonTypes.Base>(0); } }"
    ));
    let base_at = output.find("ReadBase").expect("base accessor present");
    let field_at = output.find("GetField").expect("field accessor present");
    assert!(base_at < field_at, "bases precede fields");
}

#[test]
fn enum_values_are_preserved_verbatim() {
    let fixture = materialize(
        TestModule::new().with_type(
            TestType::enumeration("Color", 4)
                .value("Red", "0")
                .value("Blue", "0x10"),
        ),
    );
    let output = render(&fixture, 0, GenerationFlags::empty());

    assert!(output.contains("public enum Color"));
    assert!(output.contains("Red = 0,"));
    assert!(output.contains("Blue = 0x10,"));
}

#[test]
fn template_family_emits_generic_wrapper_with_descriptors() {
    let fixture = materialize(
        TestModule::new()
            .with_type(TestType::udt("Vec<int>", 8).field("data", "int", 0))
            .with_type(TestType::udt("Vec<float>", 8).field("data", "float", 0))
            .with_type(TestType::udt("Vec<Vec<int>>", 8).field("data", "Vec<int>", 0)),
    );
    // Render the primary: look it up through the first specialization.
    let spec = fixture
        .factory
        .get_user_type(&fixture.symbols[0])
        .expect("specialization");
    let primary = fixture
        .factory
        .arena()
        .get(spec)
        .kind
        .as_template()
        .expect("template data")
        .primary
        .expect("primary");
    let emitter = CodeEmitter::new(GenerationFlags::empty());
    let mut writer = TextWriter::new();
    emitter.render_file(&fixture.factory, primary, &mut writer);
    let output = writer.into_buffer();

    assert!(output.contains("public class Vec<T1> : UserType"));
    // The body rebinds the first specialization's argument to T1.
    assert!(output.contains("public T1 data { get { return GetField<T1>(\"data\", 0); } }"));
    // Three specialization descriptors.
    assert!(output.contains("public static readonly string[][] Specializations ="));
    assert_eq!(output.matches("new string[] {").count(), 3);
}

#[test]
fn alias_matched_fields_emit_as_placeholders() {
    let fixture = materialize(
        TestModule::new().with_type(
            TestType::udt("Str<wchar_t>", 16).field("buffer", "unsigned short", 0),
        ),
    );
    let spec = fixture
        .factory
        .get_user_type(&fixture.symbols[0])
        .expect("specialization");
    let primary = fixture
        .factory
        .arena()
        .get(spec)
        .kind
        .as_template()
        .expect("template data")
        .primary
        .expect("primary");
    let emitter = CodeEmitter::new(GenerationFlags::empty());
    let mut writer = TextWriter::new();
    emitter.render_file(&fixture.factory, primary, &mut writer);
    let output = writer.into_buffer();

    assert!(
        output.contains("public T1 buffer { get { return GetField<T1>(\"buffer\", 0); } }"),
        "field matching the wchar_t alias must emit as the placeholder:\n{output}"
    );
    assert!(!output.contains("GetField<unsigned short>"));
}

#[test]
fn nested_types_emit_inside_their_parent() {
    let fixture = materialize(
        TestModule::new()
            .with_type(TestType::udt("Outer", 8).field("value", "int", 0))
            .with_type(TestType::udt("Outer::Inner", 4).field("x", "int", 0)),
    );
    let output = render(&fixture, 0, GenerationFlags::empty());

    assert!(output.contains("public class Outer : UserType"));
    assert!(output.contains("public class Inner : UserType"));
    let outer_close = output.rfind('}').expect("closing brace");
    let inner_at = output.find("class Inner").expect("inner emitted");
    assert!(inner_at < outer_close);
}

#[test]
fn compressed_output_drops_separator_blank_lines() {
    let module = || {
        TestModule::new().with_type(
            TestType::udt("Foo", 8)
                .field("a", "int", 0)
                .field("b", "int", 4),
        )
    };
    let plain = render(&materialize(module()), 0, GenerationFlags::empty());
    let compressed = render(
        &materialize(module()),
        0,
        GenerationFlags::COMPRESSED_OUTPUT,
    );
    assert!(plain.lines().count() > compressed.lines().count());
}

#[test]
fn cached_field_flag_switches_the_reader() {
    let fixture = materialize(
        TestModule::new().with_type(TestType::udt("Foo", 4).field("x", "int", 0)),
    );
    let output = render(&fixture, 0, GenerationFlags::CACHE_USER_TYPE_FIELDS);
    assert!(output.contains("GetCachedField<int>"));
}

#[test]
fn single_file_mode_concatenates_namespaces() {
    let fixture = materialize(
        TestModule::new()
            .with_type(TestType::udt("Foo", 4).field("x", "int", 0))
            .with_type(TestType::enumeration("Color", 4).value("Red", "0")),
    );
    let emitter = CodeEmitter::new(GenerationFlags::SINGLE_FILE_EXPORT);
    let mut writer = TextWriter::new();
    emitter.render_single_file(&fixture.factory, &mut writer);
    let output = writer.into_buffer();

    assert!(output.contains("namespace CommonTypes"));
    assert!(output.contains("public class Foo : UserType"));
    assert!(output.contains("public enum Color"));
}
