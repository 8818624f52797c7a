//! End-to-end export runs against a mock authority and Graph server.
//!
//! Tests cover:
//! - Token acquisition with the client-credentials grant
//! - Normalization and projection of fetched users
//! - Error records for malformed users without aborting the batch
//! - Authentication and HTTP failures aborting before the sink is written
//! - Writing the JSON document to disk

mod common;

use common::*;
use entra_user_export::{
    ExportError, JsonFileSink, MemorySink, Selection, UserExporter, UserField,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_export_normalizes_and_projects_users() {
    let mock = MockGraphServer::new().await;
    mock.mock_token_endpoint().await;
    mock.mock_users_pages(vec![
        vec![create_test_user("u1", "alice")],
        vec![json!({
            "id": "u2",
            "userPrincipalName": "bob@test.onmicrosoft.com",
            "displayName": "Bob",
            "mail": "bob@example.com"
        })],
    ])
    .await;

    let config = mock.config();
    let exporter = UserExporter::new(&config).unwrap();
    let selection = Selection::new([UserField::OfficeLocation, UserField::BusinessPhones]);
    let mut sink = MemorySink::default();

    let summary = exporter.run(&selection, &mut sink).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 0);

    let documents: Vec<Value> = sink
        .records
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();

    assert_eq!(
        documents[0],
        json!({
            "id": "u1",
            "userPrincipalName": "alice@test.onmicrosoft.com",
            "displayName": "Test User alice",
            "officeLocation": "18/2111",
            "businessPhones": ["+1 425 555 0100"]
        })
    );
    assert_eq!(
        documents[1],
        json!({
            "id": "u2",
            "userPrincipalName": "bob@test.onmicrosoft.com",
            "displayName": "Bob",
            "officeLocation": "",
            "businessPhones": []
        })
    );

    let keys: Vec<_> = sink.records[1].fields().keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "id",
            "userPrincipalName",
            "displayName",
            "officeLocation",
            "businessPhones"
        ]
    );
}

#[tokio::test]
async fn test_token_request_uses_client_credentials_grant() {
    let mock = MockGraphServer::new().await;

    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/v2.0/token", TEST_TENANT)))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=test-client-id"))
        .and(body_string_contains("client_secret=test-client-secret"))
        .and(body_string_contains("scope="))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(create_token_response("granted-token", 3600)),
        )
        .expect(1)
        .mount(&mock.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .and(header("authorization", "Bearer granted-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_odata_response(vec![], None)))
        .expect(1)
        .mount(&mock.server)
        .await;

    let config = mock.config();
    let exporter = UserExporter::new(&config).unwrap();
    let mut sink = MemorySink::default();
    let summary = exporter.run(&Selection::empty(), &mut sink).await.unwrap();

    assert_eq!(summary.total, 0);
}

#[tokio::test]
async fn test_malformed_user_becomes_error_record() {
    let mock = MockGraphServer::new().await;
    mock.mock_token_endpoint().await;
    mock.mock_users_pages(vec![vec![
        create_minimal_user("u1", "a@test.onmicrosoft.com"),
        json!("not-a-user"),
        create_minimal_user("u3", "c@test.onmicrosoft.com"),
    ]])
    .await;

    let config = mock.config();
    let exporter = UserExporter::new(&config).unwrap();
    let selection = Selection::new([UserField::MobilePhone]);
    let mut sink = MemorySink::default();

    let summary = exporter.run(&selection, &mut sink).await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 1);

    let failed = serde_json::to_value(&sink.records[1]).unwrap();
    assert_eq!(
        failed["user"],
        json!({"id": null, "userPrincipalName": null, "displayName": null, "mobilePhone": null})
    );
    assert!(failed["error"].as_str().unwrap().contains("string"));

    assert_eq!(sink.records[2].fields()["id"], "u3");
    assert_eq!(sink.records[2].fields()["mobilePhone"], "");
}

#[tokio::test]
async fn test_rejected_credentials_abort_before_fetch() {
    let mock = MockGraphServer::new().await;

    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/v2.0/token", TEST_TENANT)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&mock.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_odata_response(vec![], None)))
        .expect(0)
        .mount(&mock.server)
        .await;

    let config = mock.config();
    let exporter = UserExporter::new(&config).unwrap();
    let mut sink = MemorySink::default();
    let err = exporter
        .run(&Selection::empty(), &mut sink)
        .await
        .unwrap_err();

    match err {
        ExportError::Auth(message) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid_client"));
        }
        other => panic!("expected auth error, got {other:?}"),
    }
    assert!(sink.records.is_empty());
}

#[tokio::test]
async fn test_token_response_without_access_token() {
    let mock = MockGraphServer::new().await;

    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/v2.0/token", TEST_TENANT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
        .mount(&mock.server)
        .await;

    let config = mock.config();
    let exporter = UserExporter::new(&config).unwrap();
    let mut sink = MemorySink::default();
    let err = exporter
        .run(&Selection::empty(), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Auth(_)));
}

#[tokio::test]
async fn test_graph_failure_aborts_without_partial_output() {
    let mock = MockGraphServer::new().await;
    mock.mock_token_endpoint().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .respond_with(ResponseTemplate::new(403).set_body_json(create_odata_error(
            "Authorization_RequestDenied",
            "Insufficient privileges to complete the operation.",
        )))
        .mount(&mock.server)
        .await;

    let config = mock.config();
    let exporter = UserExporter::new(&config).unwrap();
    let mut sink = MemorySink::default();
    let err = exporter
        .run(&Selection::all(), &mut sink)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(sink.records.is_empty());
}

#[tokio::test]
async fn test_export_writes_json_document() {
    let mock = MockGraphServer::new().await;
    mock.mock_token_endpoint().await;
    mock.mock_users_endpoint(generate_test_users(5), 2).await;

    let dir = tempfile::tempdir().unwrap();
    let config = mock.config();
    let exporter = UserExporter::new(&config).unwrap();
    let mut sink = JsonFileSink::timestamped(dir.path());

    let summary = exporter
        .run(&Selection::new([UserField::SignInActivity]), &mut sink)
        .await
        .unwrap();
    assert_eq!(summary.total, 5);

    let written = std::fs::read_to_string(sink.path()).unwrap();
    let document: Value = serde_json::from_str(&written).unwrap();
    let users = document.as_array().unwrap();

    assert_eq!(users.len(), 5);
    assert_eq!(users[4]["id"], "user-4");
    assert_eq!(
        users[0]["signInActivity"]["lastSignInDateTime"],
        Value::Null
    );
    assert_eq!(users[0]["signInActivity"]["lastSignInRequestId"], "");
    assert!(users[0].get("officeLocation").is_none());
}

#[tokio::test]
async fn test_out_of_range_token_lifetime_is_ignored() {
    let mock = MockGraphServer::new().await;

    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/v2.0/token", TEST_TENANT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "long-lived-token",
            "token_type": "Bearer",
            "expires_in": i64::MAX
        })))
        .mount(&mock.server)
        .await;
    mock.mock_users_pages(vec![vec![create_minimal_user(
        "u1",
        "a@test.onmicrosoft.com",
    )]])
    .await;

    let config = mock.config();
    let exporter = UserExporter::new(&config).unwrap();
    let mut sink = MemorySink::default();
    let summary = exporter.run(&Selection::empty(), &mut sink).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(sink.records[0].fields()["id"], "u1");
}
