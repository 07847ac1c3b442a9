//! Gemini `generateContent` client

use std::time::Duration;

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use casegen_core::{CaseMap, GenerationUnavailable, Generator, Operation, ProviderConfig};

use crate::GatewayError;
use crate::prompt::{PING_PROMPT, build_prompt};
use crate::reply::{GenerateContentResponse, parse_cases};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Retries after the first attempt, transient transport failures only
const MAX_RETRIES: usize = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

/// Generation gateway backed by the Gemini API.
///
/// The credential is fixed at construction; without one every call fails
/// fast with [`GenerationUnavailable::MissingCredential`].
#[derive(Debug, Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    credential: Option<String>,
    temperature: f64,
    max_output_tokens: u32,
    retry_delay: Duration,
}

impl GeminiGateway {
    /// Build a gateway from provider settings.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is not a URL or the HTTP client cannot
    /// be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, GatewayError> {
        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| GatewayError::Endpoint(config.endpoint.clone(), e.to_string()))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("casegen/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            credential: config.credential().map(String::from),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Whether a usable credential is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    /// Send a minimal prompt and return the model's text.
    ///
    /// # Errors
    ///
    /// Same failure modes as generation.
    pub async fn ping(&self) -> Result<String, GenerationUnavailable> {
        let key = self.key()?;
        let reply = self.request(key, PING_PROMPT).await?;
        Ok(reply.text()?.to_string())
    }

    fn key(&self) -> Result<&str, GenerationUnavailable> {
        self.credential
            .as_deref()
            .ok_or(GenerationUnavailable::MissingCredential)
    }

    /// One `generateContent` call, retried once on timeout or connect failure.
    #[instrument(skip_all, fields(endpoint = %self.endpoint.path()))]
    async fn request(
        &self,
        key: &str,
        prompt: &str,
    ) -> Result<GenerateContentResponse, GenerationUnavailable> {
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: "application/json",
            },
        };

        let send = || async {
            self.client
                .post(self.endpoint.clone())
                .header(API_KEY_HEADER, key)
                .json(&body)
                .send()
                .await
        };

        let response = send
            .retry(
                ConstantBuilder::default()
                    .with_delay(self.retry_delay)
                    .with_max_times(MAX_RETRIES),
            )
            .when(|e: &reqwest::Error| e.is_timeout() || e.is_connect())
            .notify(|err, dur| {
                warn!("Retrying provider call after {:?}: {}", dur, err);
            })
            .await
            .map_err(|e| GenerationUnavailable::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationUnavailable::Status(status.as_u16()));
        }

        response.json::<GenerateContentResponse>().await.map_err(|e| {
            if e.is_timeout() {
                GenerationUnavailable::Transport(e.without_url().to_string())
            } else {
                GenerationUnavailable::Malformed(e.without_url().to_string())
            }
        })
    }
}

#[async_trait]
impl Generator for GeminiGateway {
    async fn generate(&self, operations: &[Operation]) -> Result<CaseMap, GenerationUnavailable> {
        let key = self.key()?;
        let prompt = build_prompt(operations)
            .map_err(|e| GenerationUnavailable::Malformed(e.to_string()))?;
        debug!(
            operations = operations.len(),
            prompt_bytes = prompt.len(),
            "requesting test cases"
        );

        let reply = self.request(key, &prompt).await?;
        let text = reply.text()?;
        debug!(reply_bytes = text.len(), "provider replied");
        parse_cases(text, operations)
    }
}
