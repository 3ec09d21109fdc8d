//! Credential manager for the report API.
//!
//! Holds a single bearer token shared by all in-flight jobs. Refreshes are
//! serialized through a guard mutex so that a burst of concurrent jobs that
//! all observe an expired token results in one sign-in round trip, not one
//! per job.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Sign-in request failed: {0}")]
    Transport(String),

    #[error("Sign-in rejected with status {0}")]
    Rejected(u16),

    #[error("Sign-in response did not contain a token")]
    MissingToken,
}

/// A bearer token together with its optional expiry.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// A credential without an expiry is valid until the server rejects it.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SigninResponse {
    token: Option<String>,
    #[serde(rename = "expiresAt")]
    expires_at: Option<DateTime<Utc>>,
}

pub struct CredentialManager {
    http: reqwest::Client,
    signin_url: String,
    email: String,
    password: String,
    current: RwLock<Option<Credential>>,
    refresh_guard: Mutex<()>,
}

impl CredentialManager {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            http,
            signin_url: format!("{}/api/Auth/signin", base_url.trim_end_matches('/')),
            email: email.into(),
            password: password.into(),
            current: RwLock::new(None),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Whether the currently held credential is usable right now.
    pub async fn is_valid(&self) -> bool {
        match self.current.read().await.as_ref() {
            Some(cred) => cred.is_valid_at(Utc::now()),
            None => false,
        }
    }

    /// The current bearer token, if any. Callers should check validity first.
    pub async fn bearer(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|cred| cred.token.clone())
    }

    /// Ensure a valid credential is held, signing in if necessary.
    ///
    /// Concurrent callers are serialized; whoever enters the guard first
    /// performs the sign-in and the rest observe the fresh credential on
    /// revalidation without another round trip.
    pub async fn authenticate(&self) -> Result<String> {
        let _guard = self.refresh_guard.lock().await;

        // Another task may have refreshed while we waited on the guard.
        if let Some(cred) = self.current.read().await.as_ref() {
            if cred.is_valid_at(Utc::now()) {
                return Ok(cred.token.clone());
            }
        }

        self.signin().await
    }

    /// Discard the current credential and sign in again unconditionally.
    ///
    /// Used when the server returns 401 for a token we believed was still
    /// valid.
    pub async fn force_refresh(&self) -> Result<String> {
        let _guard = self.refresh_guard.lock().await;
        self.signin().await
    }

    async fn signin(&self) -> Result<String> {
        tracing::debug!(url = %self.signin_url, "Signing in to report API");

        let response = self
            .http
            .post(&self.signin_url)
            .json(&serde_json::json!({
                "email": self.email,
                "password": self.password,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Sign-in rejected");
            return Err(AuthError::Rejected(status.as_u16()));
        }

        let body: SigninResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let token = body.token.ok_or(AuthError::MissingToken)?;
        let credential = Credential {
            token: token.clone(),
            expires_at: body.expires_at,
        };

        // Replace the whole credential. A failed sign-in above leaves the
        // previous one untouched.
        *self.current.write().await = Some(credential);

        tracing::info!("Obtained new API credential");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_credential_without_expiry_is_valid() {
        let cred = Credential {
            token: "t".to_string(),
            expires_at: None,
        };
        assert!(cred.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_credential_expiry_boundary() {
        let now = Utc::now();
        let fresh = Credential {
            token: "t".to_string(),
            expires_at: Some(now + Duration::minutes(5)),
        };
        let stale = Credential {
            token: "t".to_string(),
            expires_at: Some(now - Duration::seconds(1)),
        };
        let exact = Credential {
            token: "t".to_string(),
            expires_at: Some(now),
        };
        assert!(fresh.is_valid_at(now));
        assert!(!stale.is_valid_at(now));
        assert!(!exact.is_valid_at(now));
    }

    #[tokio::test]
    async fn test_manager_starts_without_credential() {
        let manager = CredentialManager::new(
            reqwest::Client::new(),
            "http://localhost:7145",
            "system@example.com",
            "secret",
        );
        assert!(!manager.is_valid().await);
        assert!(manager.bearer().await.is_none());
    }
}
