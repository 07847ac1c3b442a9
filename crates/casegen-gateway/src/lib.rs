//! casegen-gateway: external test case generation
//!
//! Sends the analyzed operations to an LLM provider in one prompt and parses
//! the reply back into a case mapping. Every failure is reported as
//! [`casegen_core::GenerationUnavailable`] so the caller can fall back.

mod gemini;
pub mod prompt;
pub mod reply;

pub use gemini::GeminiGateway;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid provider endpoint {0}: {1}")]
    Endpoint(String, String),
    #[error("HTTP client error: {0}")]
    Client(String),
}
