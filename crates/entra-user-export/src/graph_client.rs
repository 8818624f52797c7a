//! Microsoft Graph GET client with server-directed retry.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{AccessToken, ExportConfig, ExportError, ExportResult};

/// Statuses worth another attempt: throttling and gateway hiccups.
const RETRYABLE_STATUSES: [StatusCode; 3] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Returns true if a response with this status should be retried.
#[must_use]
pub fn is_retryable(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Reads `Retry-After` as whole seconds, falling back to `default` when the
/// header is absent or not an integer (HTTP-date values included).
#[must_use]
pub fn retry_after(headers: &HeaderMap, default: Duration) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

/// Authenticated GET client.
///
/// Each call to [`GraphClient::get`] gets its own attempt budget; nothing is
/// shared between calls.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    max_attempts: u32,
    default_retry_after: Duration,
}

impl GraphClient {
    /// Creates a new Graph client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ExportConfig) -> ExportResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            max_attempts: config.max_attempts,
            default_retry_after: config.default_retry_after,
        })
    }

    /// Performs a GET and returns the parsed JSON body.
    ///
    /// 429, 503 and 504 are retried after the server's `Retry-After` delay
    /// until the attempt budget runs out. Any other non-success status fails
    /// immediately with [`ExportError::Http`].
    #[instrument(skip(self, token, query, extra_headers))]
    pub async fn get(
        &self,
        url: &str,
        token: &AccessToken,
        query: &[(&str, &str)],
        extra_headers: &[(&str, &str)],
    ) -> ExportResult<Value> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let mut request = self.http_client.get(url).bearer_auth(token.bearer());
            if !query.is_empty() {
                request = request.query(query);
            }
            for (name, value) in extra_headers {
                request = request.header(*name, *value);
            }

            let response = request.send().await?;
            let status = response.status();

            if is_retryable(status) && attempt < self.max_attempts {
                let delay = retry_after(response.headers(), self.default_retry_after);
                warn!(
                    "Retryable {} on {}; sleeping {:?} ({}/{})",
                    status, url, delay, attempt, self.max_attempts
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ExportError::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                    body,
                });
            }

            debug!("GET {} succeeded after {} attempt(s)", url, attempt);
            let body = response.bytes().await?;
            return serde_json::from_slice(&body).map_err(ExportError::from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable(StatusCode::GATEWAY_TIMEOUT));
        assert!(!is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable(StatusCode::OK));
    }

    #[test]
    fn test_retry_after_seconds() {
        let default = Duration::from_secs(2);
        assert_eq!(retry_after(&headers_with("3"), default), Duration::from_secs(3));
        assert_eq!(retry_after(&headers_with(" 0 "), default), Duration::ZERO);
    }

    #[test]
    fn test_retry_after_falls_back_to_default() {
        let default = Duration::from_secs(2);
        assert_eq!(retry_after(&HeaderMap::new(), default), default);
        assert_eq!(retry_after(&headers_with("soon"), default), default);
        assert_eq!(retry_after(&headers_with("1.5"), default), default);
        assert_eq!(
            retry_after(&headers_with("Wed, 21 Oct 2015 07:28:00 GMT"), default),
            default
        );
    }
}
