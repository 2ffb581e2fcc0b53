//! End-to-end extraction against a mocked chat completion endpoint.
//!
//! Every failure mode must come back as a fallback judgment, never as an
//! error or a panic.

use std::sync::Arc;
use std::time::Duration;

use textlabel::extract::TRUNCATED_REPLY_MESSAGE;
use textlabel::{
    ChatOptions, Entity, ExtractionFailure, Extractor, FallbackPolicy, OpenAiClient, SentimentLabel,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

async fn mount_reply(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
        .mount(server)
        .await;
}

fn extractor(server: &MockServer) -> Extractor {
    let client =
        OpenAiClient::with_base_url("test_key", server.uri(), Duration::from_secs(5)).unwrap();
    Extractor::new(
        Arc::new(client),
        ChatOptions::new("gpt-4o-mini").temperature(0.1),
    )
}

#[tokio::test]
async fn sentiment_from_plain_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("太棒了！"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"sentiment": "positive", "confidence": 0.95}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let judgment = extractor(&server).classify_sentiment("太棒了！").await;

    assert!(!judgment.is_fallback());
    assert_eq!(judgment.value().sentiment, SentimentLabel::Positive);
    assert!((judgment.value().confidence - 0.95).abs() < 1e-9);
}

#[tokio::test]
async fn fenced_reply_parses_like_bare_reply() {
    let bare_server = MockServer::start().await;
    mount_reply(&bare_server, r#"{"sentiment": "negative", "confidence": 0.8}"#).await;

    let fenced_server = MockServer::start().await;
    mount_reply(
        &fenced_server,
        "```json\n{\"sentiment\": \"negative\", \"confidence\": 0.8}\n```",
    )
    .await;

    let bare = extractor(&bare_server).classify_sentiment("很失望").await;
    let fenced = extractor(&fenced_server).classify_sentiment("很失望").await;

    assert_eq!(bare, fenced);
    assert!(!fenced.is_fallback());
}

#[tokio::test]
async fn chinese_labels_are_normalized() {
    let server = MockServer::start().await;
    mount_reply(&server, r#"{"sentiment": "中性", "confidence": 0.6}"#).await;

    let judgment = extractor(&server).classify_sentiment("還不錯").await;
    assert_eq!(judgment.value().sentiment, SentimentLabel::Neutral);
}

#[tokio::test]
async fn malformed_reply_falls_back_to_parse_confidence() {
    let server = MockServer::start().await;
    mount_reply(&server, "I think this text is quite positive!").await;

    let judgment = extractor(&server).classify_sentiment("太棒了！").await;

    assert!(judgment.is_fallback());
    assert_eq!(judgment.value().sentiment, SentimentLabel::Neutral);
    assert_eq!(judgment.value().confidence, 0.5);
    let failure = judgment.failure().unwrap();
    assert!(matches!(failure, ExtractionFailure::MalformedReply(_)));
    assert!(!failure.message().is_empty());
}

#[tokio::test]
async fn service_error_falls_back_to_service_confidence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": {"message": "upstream exploded"}
        })))
        .mount(&server)
        .await;

    let judgment = extractor(&server).classify_sentiment("太棒了！").await;

    assert!(judgment.is_fallback());
    assert_eq!(judgment.value().confidence, 0.0);
    match judgment.failure() {
        Some(ExtractionFailure::Service(message)) => {
            assert!(message.contains("upstream exploded"), "{message}");
        }
        other => panic!("expected service failure, got {other:?}"),
    }
}

#[tokio::test]
async fn auth_failure_is_a_service_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let judgment = extractor(&server).extract_entities("Google").await;

    assert!(judgment.value().is_empty());
    assert_eq!(judgment.failure().map(|f| f.cause()), Some("service"));
}

#[tokio::test]
async fn custom_fallback_policy_is_used() {
    let server = MockServer::start().await;
    mount_reply(&server, "not json").await;

    let policy = FallbackPolicy {
        service_error_confidence: 0.1,
        parse_error_confidence: 0.3,
    };
    let judgment = extractor(&server)
        .with_fallback(policy)
        .classify_sentiment("x")
        .await;

    assert_eq!(judgment.value().confidence, 0.3);
}

#[tokio::test]
async fn entities_with_missing_keys_take_defaults() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        r#"Here you go:
```json
{"entities": [
  {"text": "台積電", "label": "ORGANIZATION", "confidence": 0.95},
  {"text": "台南"}
]}
```"#,
    )
    .await;

    let judgment = extractor(&server)
        .extract_entities("台積電將在台南投資")
        .await;

    assert!(!judgment.is_fallback());
    assert_eq!(
        judgment.value(),
        &vec![
            Entity::new("台積電", "ORGANIZATION", 0.95),
            Entity::new("台南", "UNKNOWN", 0.0),
        ]
    );
}

#[tokio::test]
async fn malformed_entity_reply_is_empty_fallback() {
    let server = MockServer::start().await;
    mount_reply(&server, "{\"entities\": [").await;

    let judgment = extractor(&server).extract_entities("x").await;

    assert!(judgment.is_fallback());
    assert!(judgment.value().is_empty());
    assert_eq!(judgment.failure().map(|f| f.cause()), Some("malformed_reply"));
}

#[tokio::test]
async fn truncated_reply_says_so() {
    let server = MockServer::start().await;
    let mut body = completion(r#"{"entities": [{"text": "台積電", "label": "ORGAN"#);
    body["choices"][0]["finish_reason"] = serde_json::json!("length");
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let judgment = extractor(&server).extract_entities("台積電").await;

    assert!(judgment.value().is_empty());
    assert_eq!(
        judgment.failure(),
        Some(&ExtractionFailure::MalformedReply(
            TRUNCATED_REPLY_MESSAGE.to_string()
        ))
    );
}

#[tokio::test]
async fn entity_prompt_lists_taxonomy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("ORGANIZATION"))
        .and(body_string_contains("MONEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"entities": []}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let judgment = extractor(&server).extract_entities("nothing here").await;
    assert!(!judgment.is_fallback());
    assert!(judgment.value().is_empty());
}
