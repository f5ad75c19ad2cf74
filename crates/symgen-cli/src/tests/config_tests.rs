use std::io::Write;

use tempfile::NamedTempFile;

use crate::config::{Configuration, ConfigurationError};
use symgen_common::GenerationFlags;

fn load_from_str(json: &str) -> Result<Configuration, ConfigurationError> {
    let mut file = NamedTempFile::new().expect("temporary config file");
    file.write_all(json.as_bytes()).expect("config written");
    file.flush().expect("config flushed");
    Configuration::load(file.path())
}

#[test]
fn full_configuration_round_trips() {
    let config = load_from_str(
        r#"{
            "modules": [
                { "path": "app.json", "name": "app", "namespace": "App" },
                { "path": "lib.json", "name": "lib" }
            ],
            "types": ["Engine*", "Render*"],
            "transformations": [
                { "pattern": "unsigned __int64", "replacement": "ulong" }
            ],
            "commonTypesNamespace": "Shared",
            "generationFlags": ["SingleFileExport", "SomethingNew"],
            "generatedAssemblyName": "wrappers.dll",
            "referencedAssemblies": ["runtime.dll"],
            "generatedPropsFileName": "generated.props",
            "disablePdbGeneration": true
        }"#,
    )
    .expect("valid configuration loads");

    assert_eq!(config.modules.len(), 2);
    assert_eq!(config.common_types_namespace, "Shared");
    assert_eq!(config.types, vec!["Engine*", "Render*"]);
    assert!(config.disable_pdb_generation);
    assert!(config.flags().contains(GenerationFlags::SINGLE_FILE_EXPORT));

    let descriptors = config.module_descriptors();
    assert_eq!(descriptors[0].namespace, "App");
    // An omitted namespace falls back to the module name.
    assert_eq!(descriptors[1].namespace, "lib");
}

#[test]
fn defaults_apply_to_an_empty_configuration() {
    let config = load_from_str("{}").expect("empty configuration loads");
    assert!(config.modules.is_empty());
    assert_eq!(config.common_types_namespace, "CommonTypes");
    assert!(config.generated_assembly_name.is_empty());
    assert_eq!(config.flags(), GenerationFlags::empty());
}

#[test]
fn missing_included_file_fails_fast() {
    let error = load_from_str(
        r#"{ "includedFiles": ["/definitely/not/here.cs"] }"#,
    )
    .expect_err("missing included file is rejected");
    assert!(matches!(
        error,
        ConfigurationError::MissingIncludedFile { .. }
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let error = load_from_str("{ not json").expect_err("malformed config rejected");
    assert!(matches!(error, ConfigurationError::Parse { .. }));
}
