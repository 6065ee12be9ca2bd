//! Retry behavior of the HTTP completion provider against a mock server

use std::time::{Duration, Instant};

use essaygen::completion::{CompletionProvider, OpenAiProvider};
use httpmock::prelude::*;
use serde_json::json;

fn provider_for(server: &MockServer, attempts: u32, delay_ms: u64) -> OpenAiProvider {
    OpenAiProvider::new(
        "test-key".to_string(),
        server.base_url(),
        "test-model".to_string(),
    )
    .expect("provider construction")
    .with_retry(attempts, Duration::from_millis(delay_ms))
}

#[tokio::test]
async fn returns_content_on_first_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer test-key")
                .json_body_partial(r#"{"model": "test-model", "stream": false}"#);
            then.status(200).json_body(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "那年的风筝线在我掌心勒出了印。"}}
                ]
            }));
        })
        .await;

    let provider = provider_for(&server, 3, 10);
    let content = provider.complete("主题：坚持").await.unwrap();

    assert_eq!(content, "那年的风筝线在我掌心勒出了印。");
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn stops_after_configured_attempts_and_waits_between_them() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500).body("overloaded");
        })
        .await;

    let provider = provider_for(&server, 3, 50);
    let start = Instant::now();
    let err = provider.complete("主题：坚持").await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(mock.hits_async().await, 3);
    // Two pauses between three attempts, none after the last one
    assert!(
        elapsed >= Duration::from_millis(100),
        "expected at least two retry pauses, got {:?}",
        elapsed
    );
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn single_attempt_does_not_retry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(503).body("down");
        })
        .await;

    let provider = provider_for(&server, 1, 50);
    provider.complete("主题：坚持").await.unwrap_err();

    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn malformed_payload_counts_as_a_failed_attempt() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).body("not json");
        })
        .await;

    let provider = provider_for(&server, 2, 10);
    let err = provider.complete("主题：坚持").await.unwrap_err();

    assert_eq!(mock.hits_async().await, 2);
    assert!(err.to_string().contains("parse"));
}

#[tokio::test]
async fn empty_choices_is_an_error_without_retry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({"choices": []}));
        })
        .await;

    let provider = provider_for(&server, 3, 10);
    let err = provider.complete("主题：坚持").await.unwrap_err();

    // A well-formed but empty response is terminal, not retryable
    assert_eq!(mock.hits_async().await, 1);
    assert!(err.to_string().contains("No choices"));
}
