use std::path::Path;

use schematic_catalog::{CONFIG_FILE, CollectionRegistry, MANIFEST_FILE, WorkspaceConfig};
use schematic_core::{
    DispatchConfig, GenerateCommand, GenerateOptions, GeneratorCatalog, NullSink, OptionKind,
    PrintEngine, RunOutcome,
};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_json(path: &Path, value: &Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Lays out a workspace with a `core` collection and a scoped third-party one.
fn sample_workspace(root: &Path) {
    let core = root.join("schematics").join("core");
    write_json(
        &core.join(MANIFEST_FILE),
        &json!({
            "name": "core",
            "schematics": {
                "component": {
                    "description": "Creates a component",
                    "schema": "./component/schema.json",
                    "aliases": ["c"]
                },
                "service": {
                    "description": "Creates a service",
                    "schema": "./service/schema.json"
                },
                "workspace": {"private": true}
            }
        }),
    );
    write_json(
        &core.join("component/schema.json"),
        &json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "$default": {"$source": "argv", "index": 0}},
                "style": {"enum": ["css", "scss"], "default": "css"},
                "skipTests": {"type": "boolean", "alias": "S"}
            }
        }),
    );
    write_json(
        &core.join("service/schema.json"),
        &json!({
            "properties": {
                "name": {"type": "string", "$default": {"$source": "argv", "index": 0}},
                "flat": {"type": "boolean", "default": true}
            }
        }),
    );

    let widget = root.join("node_modules").join("@acme").join("kit");
    write_json(
        &widget.join(MANIFEST_FILE),
        &json!({"schematics": {"widget": {"schema": "./widget.json"}}}),
    );
    write_json(&widget.join("widget.json"), &json!({"properties": {}}));

    std::fs::write(
        root.join(CONFIG_FILE),
        "cli:\n  default_collection: core\ncollections:\n  - schematics\n  - node_modules\n",
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// Registry discovery
// ---------------------------------------------------------------------------

#[test]
fn test_config_drives_registry() {
    let dir = tempfile::tempdir().unwrap();
    sample_workspace(dir.path());

    let config = WorkspaceConfig::discover(dir.path()).unwrap().unwrap();
    let registry = config.registry_builder(&[]).build().unwrap();

    let names: Vec<&str> = registry.collection_names().collect();
    assert_eq!(names, vec!["@acme/kit", "core"]);

    let mut listed = registry.list_names("core").unwrap();
    listed.sort();
    assert_eq!(listed, vec!["component", "service"]);
}

#[test]
fn test_private_generator_is_describable() {
    let dir = tempfile::tempdir().unwrap();
    sample_workspace(dir.path());
    let registry =
        CollectionRegistry::from_search_root(dir.path().join("schematics")).unwrap();

    let description = registry.describe("core", "workspace").unwrap();
    assert!(description.private);
    assert!(description.schema_document.is_none());
}

// ---------------------------------------------------------------------------
// End-to-end through the generate command
// ---------------------------------------------------------------------------

#[test]
fn test_generate_lists_default_collection() {
    let dir = tempfile::tempdir().unwrap();
    sample_workspace(dir.path());
    let config = WorkspaceConfig::discover(dir.path()).unwrap().unwrap();
    let registry = config.registry_builder(&[]).build().unwrap();

    let mut command = GenerateCommand::new(config.dispatch_config(), &registry);
    let spec = command.initialize(&GenerateOptions::default()).unwrap();

    let keys: Vec<&str> = spec.subcommands().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["component", "service"]);

    let component = &spec.subcommands().unwrap()["component"];
    assert_eq!(component.description.as_deref(), Some("Creates a component"));
    assert_eq!(component.aliases, vec!["c"]);
    let style = component.find_option("--style").unwrap();
    assert_eq!(
        style.kind,
        OptionKind::String {
            choices: vec!["css".into(), "scss".into()]
        }
    );
    assert!(component.find_option("-S").is_some());

    let outcome = command
        .run(&GenerateOptions::default(), &mut PrintEngine::sink())
        .unwrap();
    assert_eq!(outcome, RunOutcome::Help { schematic_hint: false });
}

#[test]
fn test_generate_third_party_collection() {
    let dir = tempfile::tempdir().unwrap();
    sample_workspace(dir.path());
    let config = WorkspaceConfig::discover(dir.path()).unwrap().unwrap();
    let registry = config.registry_builder(&[]).build().unwrap();

    let options = GenerateOptions {
        schematic: Some("@acme/kit:widget".into()),
        schematic_options: vec!["--name".into(), "hero".into()],
        dry_run: true,
        ..Default::default()
    };
    let mut command = GenerateCommand::new(config.dispatch_config(), &registry);
    let spec = command.initialize(&options).unwrap();
    assert!(spec.subcommands().unwrap().contains_key("@acme/kit:widget"));

    let mut engine = PrintEngine::new(Vec::new());
    let outcome = command.run(&options, &mut engine).unwrap();
    assert_eq!(outcome, RunOutcome::Exited(0));

    let request: Value = serde_json::from_slice(&engine.into_inner()).unwrap();
    assert_eq!(request["collectionName"], "@acme/kit");
    assert_eq!(request["schematicName"], "widget");
    assert_eq!(request["schematicOptions"], json!(["--name", "hero"]));

    let path = command.report_analytics(&options, &NullSink).unwrap();
    assert_eq!(path, vec!["generate", "@acme_kit", "widget"]);
}

#[test]
fn test_generate_unknown_collection() {
    let dir = tempfile::tempdir().unwrap();
    sample_workspace(dir.path());
    let registry =
        CollectionRegistry::from_search_root(dir.path().join("schematics")).unwrap();

    let mut command = GenerateCommand::new(DispatchConfig::default(), &registry);
    let err = command.initialize(&GenerateOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "collection \"@schematics/core\" cannot be resolved"
    );
}
