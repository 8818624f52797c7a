//! Common test utilities for entra-user-export integration tests.

#![allow(dead_code)]

use entra_user_export::ExportConfig;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const TEST_TENANT: &str = "test-tenant";

/// Test data factory for creating Entra users.
pub fn create_test_user(id: &str, email_prefix: &str) -> Value {
    json!({
        "id": id,
        "userPrincipalName": format!("{}@test.onmicrosoft.com", email_prefix),
        "displayName": format!("Test User {}", email_prefix),
        "accountEnabled": true,
        "businessPhones": ["+1 425 555 0100"],
        "officeLocation": "18/2111"
    })
}

/// Test data factory for users carrying only the core identity fields.
pub fn create_minimal_user(id: &str, upn: &str) -> Value {
    json!({
        "id": id,
        "userPrincipalName": upn,
        "displayName": "Minimal User"
    })
}

/// Generate a sequence of test users.
pub fn generate_test_users(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| create_test_user(&format!("user-{}", i), &format!("user{}", i)))
        .collect()
}

/// Wraps items in an OData response format.
pub fn create_odata_response(items: Vec<Value>, next_link: Option<&str>) -> Value {
    let mut response = json!({
        "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#users",
        "value": items
    });
    if let Some(link) = next_link {
        response["@odata.nextLink"] = json!(link);
    }
    response
}

/// Creates an OData error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Export configuration pointing both the authority and Graph at `base_url`.
pub fn test_config(base_url: &str) -> ExportConfig {
    ExportConfig::builder()
        .tenant_id(TEST_TENANT)
        .client_id("test-client-id")
        .client_secret("test-client-secret")
        .login_endpoint(base_url)
        .graph_endpoint(base_url)
        .request_timeout(Duration::from_secs(5))
        .default_retry_after(Duration::from_millis(10))
        .build()
        .expect("test config should be valid")
}

/// Matches requests that are not following a `$skiptoken` cursor.
pub struct NoSkipToken;

impl Match for NoSkipToken {
    fn matches(&self, request: &Request) -> bool {
        request.url.query_pairs().all(|(key, _)| key != "$skiptoken")
    }
}

/// Query parameter names of a received request, in order.
pub fn query_keys(request: &Request) -> Vec<String> {
    request
        .url
        .query_pairs()
        .map(|(key, _)| key.into_owned())
        .collect()
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    /// Creates a new mock Graph API server.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Returns the mock server's base URL.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> ExportConfig {
        test_config(&self.url())
    }

    pub fn users_url(&self) -> String {
        format!("{}/v1.0/users", self.url())
    }

    /// Sets up OAuth token endpoint.
    pub async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/oauth2/v2.0/token", TEST_TENANT)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response("mock-access-token", 3600)),
            )
            .mount(&self.server)
            .await;
    }

    /// Serves `pages` as a cursor chain on `/v1.0/users`.
    ///
    /// The first page answers the request without a cursor; later pages
    /// answer `$skiptoken=page<N>`.
    pub async fn mock_users_pages(&self, pages: Vec<Vec<Value>>) {
        let total_pages = pages.len();

        for (i, page) in pages.into_iter().enumerate() {
            let next_link = if i + 1 < total_pages {
                Some(format!("{}?$skiptoken=page{}", self.users_url(), i + 1))
            } else {
                None
            };
            let response = create_odata_response(page, next_link.as_deref());

            let mock = if i == 0 {
                Mock::given(method("GET"))
                    .and(path("/v1.0/users"))
                    .and(NoSkipToken)
            } else {
                Mock::given(method("GET"))
                    .and(path("/v1.0/users"))
                    .and(query_param("$skiptoken", format!("page{}", i)))
            };

            mock.respond_with(ResponseTemplate::new(200).set_body_json(response))
                .mount(&self.server)
                .await;
        }
    }

    /// Serves users split into pages of `page_size`.
    pub async fn mock_users_endpoint(&self, users: Vec<Value>, page_size: usize) {
        let pages: Vec<Vec<Value>> = users.chunks(page_size).map(|c| c.to_vec()).collect();
        self.mock_users_pages(pages).await;
    }
}
