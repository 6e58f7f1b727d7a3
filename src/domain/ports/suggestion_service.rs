//! Port for the AI suggestion service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::EngineResult;
use crate::domain::models::{ModelConfig, SuggestionPair};

/// Sampling parameters forwarded verbatim to the AI service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParameters {
    pub temperature: Option<f64>,
    pub top_k: Option<u32>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Body of `POST /suggestion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    pub vendor: String,
    pub model: String,
    /// Negation of the bug injector's decision
    pub is_correct: bool,
    pub parameters: SamplingParameters,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: &ModelConfig, has_bug: bool) -> Self {
        Self {
            prompt: prompt.into(),
            vendor: model.vendor.clone(),
            model: model.model.clone(),
            is_correct: !has_bug,
            parameters: SamplingParameters {
                temperature: model.temperature,
                top_k: model.top_k,
                top_p: model.top_p,
                max_tokens: model.max_tokens,
            },
        }
    }

    pub const fn has_bug(&self) -> bool {
        !self.is_correct
    }
}

/// Port trait for the AI suggestion service.
///
/// Implementations return the correct/flawed pair exactly as the service
/// produced it for the request's generation path. Failures are classified
/// into `NetworkFailure`, `UpstreamError` or `MalformedResponse`.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> EngineResult<SuggestionPair>;
}
