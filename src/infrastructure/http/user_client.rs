//! reqwest adapter for the user record store.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, instrument};

use super::client::{build_http_client, endpoint, error_for_status, read_json};
use super::errors::ApiError;
use super::retry::RetryPolicy;
use super::types::{Envelope, UserPatch};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::UserRecord;
use crate::domain::ports::UserStore;

/// Client for `GET`/`PATCH /users/{userId}`.
///
/// Every failure surfaces as `PolicyStateFailure`; callers decide whether to
/// fail open.
pub struct HttpUserStore {
    http_client: ReqwestClient,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl HttpUserStore {
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

    fn user_url(&self, user_id: &str) -> String {
        endpoint(&self.base_url, &format!("users/{user_id}"))
    }

    async fn fetch(&self, url: &str) -> Result<Option<UserRecord>, ApiError> {
        let response = self.http_client.get(url).send().await?;
        match error_for_status(response).await {
            Ok(response) => Ok(read_json::<Envelope<UserRecord>>(response).await?.data),
            Err(ApiError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn patch(&self, user_id: &str, patch: &UserPatch<'_>) -> EngineResult<()> {
        let url = self.user_url(user_id);
        debug!("PATCH {}", url);

        async {
            let response = self.http_client.patch(&url).json(patch).send().await?;
            error_for_status(response).await.map(drop)
        }
        .await
        .map_err(|e: ApiError| EngineError::from(e).into_policy_failure())
    }
}

#[async_trait]
impl UserStore for HttpUserStore {
    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> EngineResult<Option<UserRecord>> {
        let url = self.user_url(user_id);
        debug!("GET {}", url);

        self.retry_policy
            .execute(|| self.fetch(&url))
            .await
            .map_err(|e| EngineError::from(e).into_policy_failure())
    }

    #[instrument(skip(self))]
    async fn set_locked(&self, user_id: &str, is_locked: bool) -> EngineResult<()> {
        let patch = UserPatch {
            is_locked: Some(is_locked),
            ..UserPatch::default()
        };
        self.patch(user_id, &patch).await
    }

    #[instrument(skip(self))]
    async fn set_code_context_id(&self, user_id: &str, code_context_id: &str) -> EngineResult<()> {
        let patch = UserPatch {
            code_context_id: Some(code_context_id),
            ..UserPatch::default()
        };
        self.patch(user_id, &patch).await
    }
}
