//! Provider reply parsing
//!
//! `generateContent` replies carry the model output as text under
//! `candidates[0].content.parts[0].text`. Models often wrap JSON in markdown
//! fences or prose, so the text is trimmed down to the outermost object
//! before parsing.

use casegen_core::case::check_coverage;
use casegen_core::{CaseMap, GenerationUnavailable, Operation};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationUnavailable::EmptyReply`] when there is none or it
    /// is blank.
    pub fn text(&self) -> Result<&str, GenerationUnavailable> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(GenerationUnavailable::EmptyReply)
    }
}

/// Strip markdown fences and surrounding prose, keeping the first `{` through
/// the last `}`.
#[must_use]
pub fn cleanup_json_text(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag on the fence line
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        text = text.strip_suffix("```").unwrap_or(text).trim();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Parse model output into a case mapping covering `operations`.
///
/// # Errors
///
/// [`GenerationUnavailable::Malformed`] if the text is not JSON,
/// [`GenerationUnavailable::ShapeMismatch`] if it is JSON but not a complete
/// case mapping for these operations.
pub fn parse_cases(text: &str, operations: &[Operation]) -> Result<CaseMap, GenerationUnavailable> {
    let value: Value = serde_json::from_str(cleanup_json_text(text))
        .map_err(|e| GenerationUnavailable::Malformed(e.to_string()))?;

    if !value.is_object() {
        return Err(GenerationUnavailable::ShapeMismatch(
            "top-level value is not an object".into(),
        ));
    }

    let mut cases: CaseMap = serde_json::from_value(value)
        .map_err(|e| GenerationUnavailable::ShapeMismatch(e.to_string()))?;
    for case in cases.values_mut() {
        case.method.make_ascii_uppercase();
    }

    check_coverage(operations, &cases).map_err(GenerationUnavailable::ShapeMismatch)?;
    Ok(cases)
}
