//! Request boundary: raw spec in, envelope out

use serde_json::Value;
use tracing::{info, warn};

use crate::analyzer::analyze;
use crate::case::ResultEnvelope;
use crate::error::RequestError;
use crate::generation::Generator;
use crate::synthesizer::synthesize_all;

/// Analyze `raw_spec` and synthesize one test case per operation.
///
/// # Errors
///
/// Returns [`RequestError::InvalidSpec`] before any generation is attempted
/// when the document has no `paths` object, and
/// [`RequestError::Synthesis`] when the case mapping cannot be completed.
pub async fn process(
    raw_spec: &Value,
    generator: &dyn Generator,
) -> Result<ResultEnvelope, RequestError> {
    let operations = analyze(raw_spec)?;
    info!(operations = operations.len(), "analyzed spec");

    let synthesis = synthesize_all(&operations, generator).await?;
    info!(
        cases = synthesis.cases.len(),
        strategy = %synthesis.strategy,
        "generated test cases"
    );

    Ok(ResultEnvelope::success(
        format!("Generated test cases for {} endpoints", operations.len()),
        synthesis.cases,
    ))
}

/// Like [`process`], but every failure becomes an error envelope.
pub async fn handle(raw_spec: &Value, generator: &dyn Generator) -> ResultEnvelope {
    match process(raw_spec, generator).await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "request rejected");
            ResultEnvelope::error(e.to_string())
        }
    }
}
