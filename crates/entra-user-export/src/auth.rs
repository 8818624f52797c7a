//! OAuth2 client-credentials authentication for Microsoft Graph.
//!
//! One token is acquired per run. There is no cache and no refresh: a run
//! that outlives the token sees 401 responses surface from the Graph client.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{ExportConfig, ExportError, ExportResult};

/// Token requests are not subject to the short Graph timeout.
const TOKEN_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// OAuth2 token response from Azure AD.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: Option<String>,
}

/// OAuth2 error body (`invalid_client`, `unauthorized_client`, ...).
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Bearer token for Graph requests.
#[derive(Debug)]
pub struct AccessToken {
    secret: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Wraps a raw bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            secret: SecretString::from(token.into()),
            expires_at,
        }
    }

    /// The bearer value to put in the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> &str {
        self.secret.expose_secret()
    }

    /// Expiry reported by the token endpoint, if any.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

/// Acquires app-only tokens with the client-credentials grant.
#[derive(Debug)]
pub struct Authenticator<'a> {
    config: &'a ExportConfig,
    http_client: reqwest::Client,
}

impl<'a> Authenticator<'a> {
    /// Creates an authenticator bound to the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &'a ExportConfig) -> ExportResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Acquires a new access token.
    ///
    /// Every failure, including transport errors, is reported as
    /// [`ExportError::Auth`]. There is no retry at this layer.
    #[instrument(skip(self), fields(tenant_id = %self.config.tenant_id))]
    pub async fn acquire_token(&self) -> ExportResult<AccessToken> {
        debug!("Acquiring token");

        let scope = self.config.scope();
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.credentials.client_id.as_str()),
            (
                "client_secret",
                self.config.credentials.client_secret.expose_secret(),
            ),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http_client
            .post(self.config.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| ExportError::Auth(format!("Token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExportError::Auth(format!("Failed to read token response: {e}")))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(ExportError::Auth(format!(
                "Token request failed with status {status}: {detail}"
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ExportError::Auth(format!("Failed to parse token response: {e}")))?;

        let access_token = token_response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExportError::Auth("Token response has no access_token".into()))?;

        let token = AccessToken::new(
            access_token,
            token_response.expires_in.and_then(expiry_from_now),
        );

        match token.expires_at() {
            Some(at) => debug!(
                "Token acquired, expires at {}",
                at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => debug!("Token acquired"),
        }

        Ok(token)
    }
}

/// Absolute expiry for an `expires_in` lifetime; `None` when out of range.
fn expiry_from_now(secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|d| Utc::now().checked_add_signed(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{"token_type":"Bearer","expires_in":3599,"access_token":"eyJ0eXAi"}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token.as_deref(), Some("eyJ0eXAi"));
        assert_eq!(response.expires_in, Some(3599));
    }

    #[test]
    fn test_token_response_without_access_token() {
        let json = r#"{"token_type":"Bearer"}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(response.access_token.is_none());
    }

    #[test]
    fn test_token_error_parsing() {
        let json = r#"{
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        }"#;
        let err: TokenErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(err.error, "invalid_client");
        assert!(err.error_description.unwrap().starts_with("AADSTS7000215"));
    }

    #[test]
    fn test_expiry_from_now() {
        let at = expiry_from_now(3600).unwrap();
        assert!(at > Utc::now());
        assert!(expiry_from_now(i64::MAX).is_none());
        assert!(expiry_from_now(i64::MIN).is_none());
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret-bearer", None);
        assert_eq!(token.bearer(), "super-secret-bearer");
        assert!(!format!("{token:?}").contains("super-secret-bearer"));
    }
}
