//! reqwest adapter for the persistence/logging collaborator.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, instrument};

use super::client::{build_http_client, endpoint, error_for_status, read_json};
use super::errors::ApiError;
use super::retry::RetryPolicy;
use super::types::{Envelope, SavedSuggestion};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{LogEvent, SuggestionRecord};
use crate::domain::ports::EventLog;

/// Client for `/logs`, `/logs/suggestion` and `/logs/{userId}`.
pub struct HttpEventLog {
    http_client: ReqwestClient,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl HttpEventLog {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, ApiError> {
        Ok(Self::with_client(
            build_http_client(timeout)?,
            base_url,
            retry_policy,
        ))
    }

    pub fn with_client(
        http_client: ReqwestClient,
        base_url: impl Into<String>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            retry_policy,
        }
    }

    async fn fetch_history(
        &self,
        url: &str,
        code_context_id: Option<&str>,
    ) -> Result<Vec<LogEvent>, ApiError> {
        let mut request = self.http_client.get(url);
        if let Some(ctx) = code_context_id {
            request = request.query(&[("code_context_id", ctx)]);
        }

        let response = error_for_status(request.send().await?).await?;
        let envelope: Envelope<Vec<LogEvent>> = read_json(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }
}

#[async_trait]
impl EventLog for HttpEventLog {
    #[instrument(skip(self, record), fields(has_bug = record.has_bug, model = %record.model))]
    async fn save_suggestion(&self, record: &SuggestionRecord) -> EngineResult<String> {
        let url = endpoint(&self.base_url, "logs/suggestion");
        debug!("POST {}", url);

        let saved = async {
            let response = self.http_client.post(&url).json(record).send().await?;
            let response = error_for_status(response).await?;
            read_json::<Envelope<SavedSuggestion>>(response).await
        }
        .await
        .map_err(|e| EngineError::from(e).into_persistence_failure())?;

        saved
            .data
            .map(|s| s.id)
            .ok_or_else(|| EngineError::PersistenceFailure("no suggestion id returned".to_string()))
    }

    #[instrument(skip(self, event), fields(event = %event.event))]
    async fn track(&self, event: &LogEvent) -> EngineResult<()> {
        let url = endpoint(&self.base_url, "logs");
        debug!("POST {}", url);

        async {
            let response = self.http_client.post(&url).json(event).send().await?;
            error_for_status(response).await.map(drop)
        }
        .await
        .map_err(|e: ApiError| EngineError::from(e).into_persistence_failure())
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        user_id: &str,
        code_context_id: Option<&str>,
    ) -> EngineResult<Vec<LogEvent>> {
        let url = endpoint(&self.base_url, &format!("logs/{user_id}"));
        debug!("GET {}", url);

        let events = self
            .retry_policy
            .execute(|| self.fetch_history(&url, code_context_id))
            .await?;

        debug!(count = events.len(), "history fetched");
        Ok(events)
    }
}
