//! Generation seam: where an external provider plugs into synthesis

use async_trait::async_trait;

use crate::case::CaseMap;
use crate::error::GenerationUnavailable;
use crate::model::Operation;

/// Produces the full case mapping for a batch of operations in one call.
///
/// Implementations must return either a mapping that covers every operation
/// (keys `testcase1..N` in order) or [`GenerationUnavailable`]; the
/// synthesizer falls back to its deterministic rules on any error.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, operations: &[Operation]) -> Result<CaseMap, GenerationUnavailable>;
}

/// Generator with no provider behind it: always unavailable, never does I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl Generator for OfflineGenerator {
    async fn generate(&self, _operations: &[Operation]) -> Result<CaseMap, GenerationUnavailable> {
        Err(GenerationUnavailable::MissingCredential)
    }
}
