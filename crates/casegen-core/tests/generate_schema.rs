//! Integration test that generates test-cases.schema.json
//!
//! Run with: cargo test -p casegen-core --test generate_schema

use casegen_core::case::generate_schema;
use std::path::Path;

#[test]
fn write_schema_file() {
    let schema = generate_schema();

    // Write to workspace root
    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap();
    let schema_path = workspace_root.join("test-cases.schema.json");

    std::fs::write(&schema_path, &schema).expect("failed to write schema file");

    let content = std::fs::read_to_string(&schema_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        parsed.get("title").and_then(|v| v.as_str()),
        Some("ResultEnvelope")
    );
}

#[test]
fn fallback_envelope_validates_against_schema() {
    let schema: serde_json::Value = serde_json::from_str(&generate_schema()).unwrap();
    let validator = jsonschema::validator_for(&schema).unwrap();

    let spec = serde_json::json!({"paths": {"/pets/{id}": {"get": {
        "parameters": [{"name": "id", "in": "path", "schema": {"type": "integer"}}],
        "responses": {"200": {"description": "a pet"}}
    }}}});
    let ops = casegen_core::analyze(&spec).unwrap();
    let envelope = casegen_core::ResultEnvelope::success(
        "Generated test cases for 1 endpoints",
        casegen_core::synthesizer::fallback_cases(&ops),
    );
    let instance = serde_json::to_value(&envelope).unwrap();

    let errors: Vec<String> = validator.iter_errors(&instance).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "{errors:?}");
}
