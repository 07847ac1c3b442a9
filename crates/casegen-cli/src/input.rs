//! Loading OpenAPI documents from disk

use std::path::Path;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Cannot read {0}: {1}")]
    Io(String, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read a JSON or YAML spec file.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed
pub fn load_spec(path: &Path) -> Result<Value, InputError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| InputError::Io(path.display().to_string(), e.to_string()))?;
    parse_spec(path, &content)
}

/// Format by extension, then by content: a leading `{` means JSON.
pub fn parse_spec(path: &Path, content: &str) -> Result<Value, InputError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => parse_yaml(content),
        "json" => parse_json(content),
        _ => {
            if content.trim_start().starts_with('{') {
                parse_json(content)
            } else {
                parse_yaml(content)
            }
        }
    }
}

fn parse_json(content: &str) -> Result<Value, InputError> {
    serde_json::from_str(content).map_err(|e| InputError::Parse(format!("Invalid JSON: {e}")))
}

fn parse_yaml(content: &str) -> Result<Value, InputError> {
    serde_yml::from_str(content).map_err(|e| InputError::Parse(format!("Invalid YAML: {e}")))
}
