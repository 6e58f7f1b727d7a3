//! reqwest adapter for the AI suggestion service.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, instrument};

use super::client::{build_http_client, endpoint, read_json};
use super::errors::ApiError;
use super::types::{Envelope, SuggestionsPayload};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::SuggestionPair;
use crate::domain::ports::{GenerationRequest, SuggestionService};

/// Client for `POST /suggestion`.
///
/// Requests are never retried: a failed generation simply means no
/// suggestion for this pause in typing.
pub struct HttpSuggestionService {
    http_client: ReqwestClient,
    base_url: String,
}

impl HttpSuggestionService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_http_client(timeout)?, base_url))
    }

    pub fn with_client(http_client: ReqwestClient, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SuggestionService for HttpSuggestionService {
    #[instrument(skip(self, request), fields(vendor = %request.vendor, model = %request.model, is_correct = request.is_correct))]
    async fn generate(&self, request: &GenerationRequest) -> EngineResult<SuggestionPair> {
        let url = endpoint(&self.base_url, "suggestion");
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::UpstreamError {
                status: status.as_u16(),
                message: format!(
                    "Error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                ),
            });
        }

        let envelope: Envelope<SuggestionsPayload> = read_json(response).await?;
        let reason = envelope.reason().unwrap_or("Unknown error").to_string();

        envelope
            .data
            .and_then(|payload| SuggestionPair::from_ordered(&payload.suggestions))
            .ok_or(EngineError::MalformedResponse {
                status: status.as_u16(),
                message: reason,
            })
    }
}
