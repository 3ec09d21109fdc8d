//! HTTP gateway to the report API.
//!
//! Fetches raw report payloads for a job, handling authentication through the
//! shared [`CredentialManager`]. A 401 on a fetch triggers exactly one forced
//! re-authentication and one retry; a second rejection is treated as an
//! authentication failure rather than retried further.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::CredentialManager;
use crate::report::ReportType;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Upstream returned status {status}: {snippet}")]
    Upstream { status: u16, snippet: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response body: {0}")]
    Decode(String),
}

const SNIPPET_LIMIT: usize = 200;

pub struct ReportClient {
    http: reqwest::Client,
    auth: Arc<CredentialManager>,
    base_url: String,
}

impl ReportClient {
    pub fn new(http: reqwest::Client, auth: Arc<CredentialManager>, base_url: &str) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the raw payload for a report job.
    pub async fn fetch(
        &self,
        report_type: ReportType,
        job_id: &str,
    ) -> Result<serde_json::Value> {
        if !self.auth.is_valid().await {
            self.auth
                .authenticate()
                .await
                .map_err(|e| FetchError::AuthFailed(e.to_string()))?;
        }

        let url = format!("{}{}", self.base_url, report_type.endpoint(job_id));
        tracing::debug!(%url, report_type = report_type.key(), "Fetching report payload");

        let response = self.get(&url).await?;

        if response.status().as_u16() == 401 {
            tracing::info!("Token rejected by report API, refreshing and retrying once");
            self.auth
                .force_refresh()
                .await
                .map_err(|e| FetchError::AuthFailed(e.to_string()))?;

            let retry = self.get(&url).await?;
            return self.decode(retry, true).await;
        }

        self.decode(response, false).await
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let token = self
            .auth
            .bearer()
            .await
            .ok_or_else(|| FetchError::AuthFailed("no credential held".to_string()))?;

        self.http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Transport(e.to_string())
                }
            })
    }

    async fn decode(&self, response: reqwest::Response, retried: bool) -> Result<serde_json::Value> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| FetchError::Decode(e.to_string()));
        }

        // After a forced refresh, any further rejection means the credentials
        // themselves are no good.
        if retried {
            return Err(FetchError::AuthFailed(format!(
                "request rejected with status {} after token refresh",
                status.as_u16()
            )));
        }

        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(SNIPPET_LIMIT).collect();
        Err(FetchError::Upstream {
            status: status.as_u16(),
            snippet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display_includes_status() {
        let err = FetchError::Upstream {
            status: 500,
            snippet: "Internal Server Error".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[test]
    fn test_snippet_limit() {
        let body = "x".repeat(500);
        let snippet: String = body.chars().take(SNIPPET_LIMIT).collect();
        assert_eq!(snippet.len(), 200);
    }
}
