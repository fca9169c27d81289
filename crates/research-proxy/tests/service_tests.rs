//! Research pipeline tests against a mocked Perplexity API.
//!
//! Covers prompt delivery, citation tiers, and upstream error classification.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use research_proxy::config::Config;
use research_proxy::prompt;
use research_proxy::{ResearchError, ResearchService};

fn setup_service(mock_server: &MockServer) -> ResearchService {
    let config = Config::for_testing(&mock_server.uri());
    ResearchService::new(&config).unwrap()
}

fn completion(text: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "model": "sonar",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": { "role": "assistant", "content": text }
        }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200 }
    })
}

const REPORT: &str = "**Key Findings:**\n- Error correction milestones (https://quantum.example.org/qec).\n\n\
**Important Facts:**\n- Logical qubits remain scarce.\n\n\
**Research Gaps:**\n- Scalable decoders.\n\n\
**Future Research Ideas:**\n- Hybrid algorithms.";

// =============================================================================
// End-to-end Pipeline
// =============================================================================

#[tokio::test]
async fn test_news_topic_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "sonar",
            "temperature": 0.7,
            "max_tokens": 2000
        })))
        .and(body_string_contains("quantum computing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(REPORT)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let result = service.handle("quantum computing", "news").await.unwrap();

    assert_eq!(result.result, REPORT);
    assert_eq!(result.sources, vec!["https://quantum.example.org/qec"]);
}

#[tokio::test]
async fn test_prompt_sent_as_system_then_user() {
    let mock_server = MockServer::start().await;

    let expected_user = prompt::build_prompt("soil microbiome", research_proxy::models::SearchType::Academic);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_PROMPT },
                { "role": "user", "content": expected_user }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    service.handle("soil microbiome", "academic").await.unwrap();
}

#[tokio::test]
async fn test_unknown_search_type_sends_unprefixed_prompt() {
    let mock_server = MockServer::start().await;

    let expected_user = prompt::build_prompt("graphene", research_proxy::models::SearchType::All);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_PROMPT },
                { "role": "user", "content": expected_user }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    service.handle("graphene", "blogs").await.unwrap();
}

// =============================================================================
// Citation Tiers
// =============================================================================

#[tokio::test]
async fn test_top_level_citations_win() {
    let mock_server = MockServer::start().await;

    let mut body = completion("See https://ignored.example for more.");
    body["citations"] = json!(["u1", "u2"]);
    body["choices"][0]["citations"] = json!(["c1"]);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let result = service.handle("topic", "all").await.unwrap();

    assert_eq!(result.sources, vec!["u1", "u2"]);
}

#[tokio::test]
async fn test_choice_citations_used_without_top_level() {
    let mock_server = MockServer::start().await;

    let mut body = completion("See https://ignored.example for more.");
    body["choices"][0]["citations"] = json!(["https://c1.example", "https://c2.example"]);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let result = service.handle("topic", "all").await.unwrap();

    assert_eq!(result.sources, vec!["https://c1.example", "https://c2.example"]);
}

#[tokio::test]
async fn test_text_scan_fallback_dedups() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("See https://a.com/x and https://a.com/x.")),
        )
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let result = service.handle("topic", "all").await.unwrap();

    assert_eq!(result.sources, vec!["https://a.com/x"]);
}

#[tokio::test]
async fn test_no_sources_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Plain answer.")))
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let result = service.handle("topic", "all").await.unwrap();

    assert_eq!(result.result, "Plain answer.");
    assert!(result.sources.is_empty());
}

// =============================================================================
// Validation and Configuration
// =============================================================================

#[tokio::test]
async fn test_blank_topic_makes_no_upstream_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let err = service.handle("   ", "news").await.unwrap_err();

    assert!(matches!(err, ResearchError::InvalidInput(_)));
}

#[tokio::test]
async fn test_missing_key_makes_no_upstream_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Config { api_key: None, ..Config::for_testing(&mock_server.uri()) };
    let service = ResearchService::new(&config).unwrap();
    let err = service.handle("fusion", "all").await.unwrap_err();

    assert!(matches!(err, ResearchError::Configuration));
    assert_eq!(err.code(), "configuration_error");
}

// =============================================================================
// Upstream Error Classification
// =============================================================================

async fn classify_status(status: u16, body: &str) -> ResearchError {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    service.handle("topic", "all").await.unwrap_err()
}

#[tokio::test]
async fn test_upstream_400_carries_error_body() {
    let err = classify_status(
        400,
        r#"{"error":{"message":"Invalid model 'sonar-x'","type":"invalid_model","code":400}}"#,
    )
    .await;

    let ResearchError::UpstreamBadRequest { details } = &err else {
        panic!("expected UpstreamBadRequest, got {err:?}");
    };
    assert_eq!(details["type"], "invalid_model");
    assert_eq!(err.details(), Some(details));
}

#[tokio::test]
async fn test_upstream_401_is_auth_failure() {
    let err = classify_status(401, r#"{"error":"invalid key"}"#).await;
    assert!(matches!(err, ResearchError::UpstreamAuthFailure));
    assert_eq!(err.status().as_u16(), 401);
}

#[tokio::test]
async fn test_upstream_404_is_not_found() {
    let err = classify_status(404, "Not Found").await;
    assert!(matches!(err, ResearchError::UpstreamNotFound));
}

#[tokio::test]
async fn test_upstream_429_is_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let err = service.handle("topic", "all").await.unwrap_err();

    assert!(matches!(
        err,
        ResearchError::UpstreamRateLimited { retry_after: Some(d) } if d.as_secs() == 12
    ));
}

#[tokio::test]
async fn test_upstream_500_is_unknown_without_body() {
    let err = classify_status(500, "upstream exploded").await;

    let ResearchError::UpstreamUnknown(message) = &err else {
        panic!("expected UpstreamUnknown, got {err:?}");
    };
    assert_eq!(message, "Upstream request failed with status 500");
    assert!(!message.contains("upstream exploded"));
}

#[tokio::test]
async fn test_upstream_unexpected_status_is_unknown() {
    let err = classify_status(418, "teapot").await;
    assert_eq!(err.code(), "upstream_unknown");
}

#[tokio::test]
async fn test_malformed_upstream_json_is_unknown() {
    let err = classify_status(200, "{ invalid json here").await;
    assert_eq!(err.code(), "upstream_unknown");
}

#[tokio::test]
async fn test_payload_without_choices_is_internal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x", "choices": []})))
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let err = service.handle("topic", "all").await.unwrap_err();

    assert!(matches!(err, ResearchError::Internal(_)));
    assert_eq!(err.to_user_message(), "Failed to fetch research results");
}

#[tokio::test]
async fn test_null_citation_entries_keep_the_answer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "citations": ["https://a.example", null],
            "choices": [{ "message": { "content": "good answer" } }]
        })))
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let result = service.handle("topic", "all").await.unwrap();

    assert_eq!(result.result, "good answer");
    assert_eq!(result.sources, vec!["https://a.example"]);
}

#[tokio::test]
async fn test_null_content_is_internal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [{ "message": { "content": null } }] })),
        )
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    let err = service.handle("topic", "all").await.unwrap_err();

    assert!(matches!(err, ResearchError::Internal(_)));
}

#[tokio::test]
async fn test_unreachable_upstream_is_unknown() {
    // Nothing listens on port 9 (discard) in the test environment.
    let config = Config::for_testing("http://127.0.0.1:9");
    let service = ResearchService::new(&config).unwrap();

    let err = service.handle("topic", "all").await.unwrap_err();
    assert_eq!(err.code(), "upstream_unknown");
}

#[tokio::test]
async fn test_exactly_one_attempt_on_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = setup_service(&mock_server);
    assert!(service.handle("topic", "all").await.is_err());
}
