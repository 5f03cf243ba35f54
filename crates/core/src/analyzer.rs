//! Conflict analysis: one prompt per drug, sent to a generative model, with bounded retries.
//!
//! The analyzer never fails. Every error path resolves to a single `ERROR` alert so the report
//! keeps its shape.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::constants::{INITIAL_BACKOFF_SECS, MAX_MODEL_ATTEMPTS};
use crate::prompt::{build_prompt, response_schema, SYSTEM_INSTRUCTION};
use crate::types::{Alert, DrugRecord};
use crate::validation::parse_alerts;

/// Everything the model needs for one stateless call.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub response_schema: Value,
}

/// Failures from a model call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("model rate limit exceeded (429): {0}")]
    RateLimited(String),
    #[error("model service unavailable (503): {0}")]
    Unavailable(String),
    #[error("model returned error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("model returned no content")]
    EmptyResponse,
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    #[error("model response violates schema: {0}")]
    SchemaViolation(String),
}

impl ModelError {
    /// Whether a fresh attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ModelError::RateLimited(_)
                | ModelError::Unavailable(_)
                | ModelError::MalformedResponse(_)
                | ModelError::SchemaViolation(_)
        )
    }
}

/// A generative model that returns JSON text for a request.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError>;
}

/// Attempt limit and exponential backoff between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based). Doubles every attempt.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_MODEL_ATTEMPTS,
            initial_backoff: Duration::from_secs(INITIAL_BACKOFF_SECS),
        }
    }
}

/// Analyzer settings built once at startup.
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    pub system_instruction: String,
    pub response_schema: Value,
    pub retry: RetryPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            response_schema: response_schema(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Final message when every attempt failed transiently.
pub const RETRIES_EXHAUSTED: &str = "Could not analyze drug after multiple retries.";

/// Cross-references a profile against a drug's label text.
#[derive(Clone)]
pub struct ConflictAnalyzer {
    model: Arc<dyn ModelClient>,
    config: AnalyzerConfig,
}

impl ConflictAnalyzer {
    pub fn new(model: Arc<dyn ModelClient>, config: AnalyzerConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one drug. Always returns at least one alert.
    pub async fn analyze(&self, profile_text: &str, drug: &DrugRecord) -> Vec<Alert> {
        let request = ModelRequest {
            system_instruction: self.config.system_instruction.clone(),
            prompt: build_prompt(profile_text, drug),
            response_schema: self.config.response_schema.clone(),
        };
        let retry = self.config.retry;

        for attempt in 1..=retry.max_attempts {
            let result = self
                .model
                .generate(&request)
                .await
                .and_then(|raw| parse_alerts(&raw));

            match result {
                Ok(alerts) => return alerts,
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        drug = %drug.generic_name,
                        attempt,
                        error = %e,
                        "model call failed, retrying"
                    );
                    if attempt < retry.max_attempts {
                        tokio::time::sleep(retry.backoff_after(attempt)).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        drug = %drug.generic_name,
                        attempt,
                        error = %e,
                        "model call failed"
                    );
                    return vec![Alert::error(format!("Could not analyze drug: {e}"))];
                }
            }
        }

        tracing::error!(drug = %drug.generic_name, "model retries exhausted");
        vec![Alert::error(RETRIES_EXHAUSTED)]
    }
}
