use std::sync::Arc;

use newsbrief::gateway::{SummarizationGateway, SummarizationOutcome};
use newsbrief::llm::remote::RemoteSummarizer;

/// A malformed URL must be rejected before the capability is ever contacted.
#[tokio::test]
async fn test_validation_failure_never_reaches_the_api() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body("{}")
        .expect(0)
        .create_async()
        .await;

    let provider = Arc::new(RemoteSummarizer::new(
        server.url(),
        "fake-api-key",
        "gpt-4o-mini",
    ));
    let gateway = SummarizationGateway::new(provider);

    let outcome = gateway.submit("not a url").await;

    match outcome {
        SummarizationOutcome::Failure {
            message,
            field_errors,
            ..
        } => {
            assert_eq!(message, "Validation Error");
            assert!(field_errors.is_some());
        }
        other => panic!("expected validation failure, got {:?}", other),
    }

    mock.assert_async().await;
}

/// A capability failure surfaces through the gateway as a failure envelope,
/// leaving the message intact for the page.
#[tokio::test]
async fn test_capability_failure_maps_to_failure_envelope() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_body(r#"{"error": {"message": "backend exploded"}}"#)
        .create_async()
        .await;

    let provider = Arc::new(RemoteSummarizer::new(
        server.url(),
        "fake-api-key",
        "gpt-4o-mini",
    ));
    let gateway = SummarizationGateway::new(provider);

    let outcome = gateway.submit("https://example.com/article").await;

    match outcome {
        SummarizationOutcome::Failure {
            message,
            error,
            field_errors,
        } => {
            assert_eq!(message, "Summarization Failed");
            assert!(error.contains("500"), "unexpected error: {}", error);
            assert!(field_errors.is_none());
        }
        other => panic!("expected failure, got {:?}", other),
    }

    mock.assert_async().await;
}

/// Full success path against the mocked capability.
#[tokio::test]
async fn test_success_round_trip() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "{\"summary\": \"S\", \"country\": \"Chad\"}"
                    }
                }]
            }"#,
        )
        .create_async()
        .await;

    let provider = Arc::new(RemoteSummarizer::new(
        server.url(),
        "fake-api-key",
        "gpt-4o-mini",
    ));
    let gateway = SummarizationGateway::new(provider);

    let outcome = gateway.submit("https://example.com/a").await;

    match outcome {
        SummarizationOutcome::Success {
            original_url,
            summary,
            ..
        } => {
            assert_eq!(original_url, "https://example.com/a");
            assert_eq!(summary.summary, "S");
            assert_eq!(summary.country.as_deref(), Some("Chad"));
        }
        other => panic!("expected success, got {:?}", other),
    }

    mock.assert_async().await;
}
