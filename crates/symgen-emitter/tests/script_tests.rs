//! Script precompiler behavior.

use std::path::PathBuf;

use symgen_emitter::script::{SCRIPT_CLASS, SCRIPT_ENTRY_POINT, SCRIPT_NAMESPACE};
use symgen_emitter::{ScriptError, precompile};

fn write_script(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("test script written");
    path
}

#[test]
fn wrapper_holds_hoisted_usings_and_entry_point() {
    let dir = tempfile::tempdir().expect("temp dir");
    let main = write_script(
        dir.path(),
        "main.csx",
        "using System;\nusing Collections;\nConsole.WriteLine(42);\n",
    );

    let script = precompile(&main, &[]).expect("precompiles");

    assert_eq!(script.usings, vec!["Collections", "System"]);
    assert!(script.code.starts_with("using Collections;\nusing System;\n"));
    assert!(script.code.contains(&format!("namespace {SCRIPT_NAMESPACE}")));
    assert!(script.code.contains(&format!("public class {SCRIPT_CLASS}")));
    assert!(script.code.contains(&format!("public void {SCRIPT_ENTRY_POINT}()")));
    assert!(script.code.contains("Console.WriteLine(42);"));
    // The hoisted using is blanked out of the body, not repeated there.
    let body_at = script.code.find("#line 1").expect("line directive");
    assert!(!script.code[body_at..].contains("using System;"));
}

#[test]
fn imports_expand_recursively_and_deduplicate() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_script(
        dir.path(),
        "shared.csx",
        "using Shared;\nint SharedValue() { return 7; }\n",
    );
    write_script(
        dir.path(),
        "helper.csx",
        "import \"shared.csx\";\nint Helper() { return SharedValue(); }\n",
    );
    let main = write_script(
        dir.path(),
        "main.csx",
        "import \"helper.csx\";\nimport \"shared.csx\";\nHelper();\n",
    );

    let script = precompile(&main, &[]).expect("precompiles");

    // The diamond import lands once.
    assert_eq!(script.code.matches("int SharedValue()").count(), 1);
    assert_eq!(script.code.matches("int Helper()").count(), 1);
    // Dependencies precede their importers.
    let shared_at = script.code.find("int SharedValue()").expect("shared code");
    let helper_at = script.code.find("int Helper()").expect("helper code");
    assert!(shared_at < helper_at);
    assert_eq!(script.usings, vec!["Shared"]);
    assert!(!script.code.contains("import "));
}

#[test]
fn imports_resolve_through_search_folders() {
    let dir = tempfile::tempdir().expect("temp dir");
    let lib = tempfile::tempdir().expect("temp lib dir");
    write_script(lib.path(), "util.csx", "int Util() { return 1; }\n");
    let main = write_script(dir.path(), "main.csx", "import \"util.csx\";\nUtil();\n");

    let script =
        precompile(&main, &[lib.path().to_path_buf()]).expect("precompiles via search folder");
    assert!(script.code.contains("int Util()"));
}

#[test]
fn line_directives_map_back_to_sources() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_script(dir.path(), "helper.csx", "int Helper() { return 2; }\n");
    let main = write_script(dir.path(), "main.csx", "import \"helper.csx\";\nHelper();\n");

    let script = precompile(&main, &[]).expect("precompiles");

    assert!(script.code.contains(&format!("#line 1 \"{}\"", dir.path().join("helper.csx").display())));
    assert!(script.code.contains(&format!("#line 1 \"{}\"", main.display())));
    assert_eq!(script.code.matches("#line default").count(), 2);
}

#[test]
fn comments_and_masked_strings_do_not_trigger_directives() {
    let dir = tempfile::tempdir().expect("temp dir");
    let main = write_script(
        dir.path(),
        "main.csx",
        "// import \"phantom.csx\";\nstring s = \"using Fake;\";\n/* using Ghost; */\ns.Length;\n",
    );

    let script = precompile(&main, &[]).expect("precompiles");

    assert!(script.usings.is_empty());
    assert!(script.code.contains("using Fake;"), "string literal preserved");
    assert!(!script.code.contains("Ghost"));
}

#[test]
fn missing_import_is_reported_with_its_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let main = write_script(dir.path(), "main.csx", "import \"nowhere.csx\";\n");

    let error = precompile(&main, &[]).expect_err("import cannot resolve");
    match error {
        ScriptError::ImportNotFound { import, from } => {
            assert_eq!(import, "nowhere.csx");
            assert_eq!(from, main);
        }
        other => panic!("unexpected error: {other}"),
    }
}
