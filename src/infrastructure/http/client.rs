//! Shared reqwest plumbing for the remote services.

use reqwest::{Client as ReqwestClient, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::ApiError;

/// Build the HTTP client shared by all adapters.
///
/// Connection pooling is per client, so one instance should back every
/// adapter talking to the same hosts.
pub fn build_http_client(timeout: Duration) -> Result<ReqwestClient, ApiError> {
    ReqwestClient::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .tcp_nodelay(true)
        .build()
        .map_err(ApiError::NetworkError)
}

/// Join a base URL and a path without doubling slashes.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Turn a non-success response into a classified error.
pub async fn error_for_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    debug!(%status, url = %response.url(), "response received");

    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());
    warn!(%status, %body, "remote service returned an error");

    Err(ApiError::from_status(status, body))
}

/// Read a successful response body as JSON.
///
/// The body is read as text first so decode failures are reported as
/// `ApiError::Decode` rather than as transport errors.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}
