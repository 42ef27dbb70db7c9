//! Integration tests for the Gemini client using WireMock
//!
//! These tests mock the Gemini HTTP API to verify request shape, response
//! extraction and error mapping without a real API key.

use std::time::Duration;

use nutricare::config::GeminiConfig;
use nutricare::db::Database;
use nutricare::engine::KeywordClassifier;
use nutricare::llm::{GeminiClient, LlmError, TextGenerator, NO_RECOMMENDATION_TEXT};
use nutricare::tools::recommendations::get_ai_recommendation;
use secrecy::SecretString;
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

// =============================================================================
// Test Helpers
// =============================================================================

const MODEL_PATH: &str = "/v1beta/models/test-model:generateContent";

fn client_for_mock(base_url: &str) -> GeminiClient {
    let mut config = GeminiConfig::new(SecretString::from("test-key".to_string()));
    config.model = "test-model".to_string();
    config.base_url = base_url.to_string();
    config.timeout = Duration::from_secs(5);
    GeminiClient::new(config).unwrap()
}

fn candidate_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            {
                "content": {
                    "role": "model",
                    "parts": [{"text": text}, {"text": "ignored second part"}]
                },
                "finishReason": "STOP"
            }
        ]
    })
}

// =============================================================================
// Client Tests
// =============================================================================

#[tokio::test]
async fn test_returns_first_candidate_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .and(body_json(serde_json::json!({
            "contents": [{"parts": [{"text": "Suggest a breakfast"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_response("Eat poha")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for_mock(&server.uri());
    let text = client.complete("Suggest a breakfast").await.unwrap();
    assert_eq!(text, "Eat poha");
}

#[tokio::test]
async fn test_missing_candidates_fall_back_to_placeholder_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let client = client_for_mock(&server.uri());
    let text = client.complete("anything").await.unwrap();
    assert_eq!(text, NO_RECOMMENDATION_TEXT);
}

#[tokio::test]
async fn test_error_status_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for_mock(&server.uri());
    let err = client.complete("anything").await.unwrap_err();

    match err {
        LlmError::Status { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for_mock(&server.uri());
    let err = client.complete("anything").await.unwrap_err();
    assert!(matches!(err, LlmError::Decode(_)));
}

#[tokio::test]
async fn test_request_error_does_not_expose_api_key() {
    // Nothing listens on a port freed by a dropped listener
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = client_for_mock(&format!("http://127.0.0.1:{}", port));
    let err = client.complete("anything").await.unwrap_err();

    assert!(matches!(err, LlmError::Request(_)), "expected request error, got {:?}", err);
    assert!(!err.to_string().contains("test-key"));
    assert!(!format!("{:?}", err).contains("test-key"));
}

// =============================================================================
// AI Recommendation Flow
// =============================================================================

#[tokio::test]
async fn test_ai_recommendation_end_to_end() {
    let server = MockServer::start().await;

    let reply = "Given the following user profile, provide personalized nutrition and health recommendations.\n\
                 Profile: {\"full_name\": \"Your Name\"}\n\
                 Include ragi and jowar rotis\n\
                 Avoid deep fried snacks\n\
                 Walk every evening";

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_response(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let db = Database::open_migrated(dir.path().join("nutricare.db")).unwrap();
    let client = client_for_mock(&server.uri());

    let response = get_ai_recommendation(&db, &client, &KeywordClassifier, "user-1")
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.raw_text.as_deref(), Some(reply));
    let classified = response.classified.unwrap();
    assert_eq!(classified.recommended, vec!["Include ragi and jowar rotis"]);
    assert_eq!(classified.not_recommended, vec!["Avoid deep fried snacks"]);
}
