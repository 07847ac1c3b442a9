//! Error taxonomy shared by the analyzer, synthesizer and generation seam

/// The incoming document cannot be analyzed. Surfaced to the caller as a
/// client error and never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSpec {
    #[error("OpenAPI spec must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("OpenAPI spec has no `paths` object")]
    MissingPaths,
    #[error("`paths` must be an object, found {0}")]
    PathsNotAnObject(&'static str),
}

/// The external generator could not produce a usable case mapping.
///
/// Every variant is recovered locally by switching to the fallback rules;
/// callers only need to know that generation is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationUnavailable {
    #[error("no provider credential configured")]
    MissingCredential,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("provider reply contained no candidate text")]
    EmptyReply,
    #[error("provider reply is not valid JSON: {0}")]
    Malformed(String),
    #[error("provider reply does not match the case mapping: {0}")]
    ShapeMismatch(String),
}

/// Internal fault while assembling the case mapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisFailure {
    #[error("case mapping does not cover every operation: {0}")]
    Incomplete(String),
}

/// Everything `process` can reject a request with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid OpenAPI specification: {0}")]
    InvalidSpec(#[from] InvalidSpec),
    #[error("Failed to generate test cases: {0}")]
    Synthesis(#[from] SynthesisFailure),
}

/// JSON type name used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
