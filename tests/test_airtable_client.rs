//! Integration tests for the Airtable request gateway
//!
//! Behavioral contracts only: authentication headers, body passthrough,
//! and the two-way classification of non-success responses.

use std::time::Duration;

use airtable_mcp::airtable::{AirtableClient, AirtableConfig, AirtableError, ApiFailure};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AirtableClient {
    AirtableClient::new(AirtableConfig {
        api_key: "test-api-key".to_string(),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_request_sends_bearer_credential_and_json_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta/bases"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bases": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let result = client.request(Method::GET, "/meta/bases", None).await;

    assert_eq!(result.unwrap(), json!({"bases": []}));
}

#[tokio::test]
async fn test_request_passes_body_through_unchanged() {
    let mock_server = MockServer::start().await;

    let body = json!({"records": [{"fields": {"Name": "Test"}}]});
    Mock::given(method("POST"))
        .and(path("/app123/Tasks"))
        .and(body_json(body.clone()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"records": [{"id": "rec1", "fields": {"Name": "Test"}}]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let result = client
        .request(Method::POST, "/app123/Tasks", Some(&body))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_extra_headers_override_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta/bases"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/vnd.api+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bases": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut extra = HeaderMap::new();
    extra.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/vnd.api+json"),
    );

    let client = test_client(&mock_server.uri());
    let result = client
        .request_with_headers(Method::GET, "/meta/bases", None, extra)
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_non_success_with_error_message_reports_message_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta/bases/app404/tables"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "type": "NOT_FOUND",
                "message": "Could not find what you are looking for"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let error = client
        .request(Method::GET, "/meta/bases/app404/tables", None)
        .await
        .unwrap_err();

    match error {
        AirtableError::Api(ApiFailure::Remote { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Could not find what you are looking for");
        }
        other => panic!("Expected remote API failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_success_with_unparsable_body_reports_status_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta/bases"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let error = client
        .request(Method::GET, "/meta/bases", None)
        .await
        .unwrap_err();

    match error {
        AirtableError::Api(failure) => {
            assert_eq!(failure, ApiFailure::Status(500));
            assert_eq!(failure.to_string(), "Airtable API error: 500");
        }
        other => panic!("Expected API failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_success_with_empty_body_reports_status_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta/bases"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let error = client
        .request(Method::GET, "/meta/bases", None)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        AirtableError::Api(ApiFailure::Status(401))
    ));
}

#[tokio::test]
async fn test_non_success_json_body_without_message_reports_status_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta/bases"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "INVALID_REQUEST"})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let error = client
        .request(Method::GET, "/meta/bases", None)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        AirtableError::Api(ApiFailure::Status(422))
    ));
}

#[tokio::test]
async fn test_success_with_non_json_body_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta/bases"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let error = client
        .request(Method::GET, "/meta/bases", None)
        .await
        .unwrap_err();

    assert!(matches!(error, AirtableError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    // Nothing listens on this port
    let client = test_client("http://127.0.0.1:9");
    let error = client
        .request(Method::GET, "/meta/bases", None)
        .await
        .unwrap_err();

    assert!(matches!(error, AirtableError::Network(_)));
}

#[test]
fn test_client_creation_requires_api_key() {
    let result = AirtableClient::new(AirtableConfig::default());

    match result {
        Err(AirtableError::NotConfigured(message)) => {
            assert!(message.contains("API key"));
        }
        _ => panic!("Expected NotConfigured error"),
    }
}
