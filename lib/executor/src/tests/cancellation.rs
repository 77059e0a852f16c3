use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::execution::state::RequestState;
use crate::execution::{execute_operation, ExecutionRequest};
use crate::executors::map::SourceSchemaExecutorMap;
use crate::tests::testkit::{init_logger, plain_split, SourceRecorder};

#[tokio::test]
async fn cancelling_drops_in_flight_dispatches() {
    init_logger();
    let schema = plain_split();
    let recorder = SourceRecorder::default();
    let executors = SourceSchemaExecutorMap::new()
        .with_executor(
            "catalog",
            recorder.source("catalog", r#"{"data":{"product":{"id":"1"}}}"#),
        )
        .with_executor(
            "pricing",
            recorder.delayed_source(
                "pricing",
                Duration::from_secs(5),
                r#"{"data":{"product":{"price":9.99}}}"#,
            ),
        );
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let request = ExecutionRequest::new(r#"{ product(id: "1") { id price } }"#);
    let response = execute_operation(&schema, &executors, &request, &token).await;

    assert_eq!(response.state, RequestState::Cancelled);
    assert_eq!(
        response.to_json(),
        r#"{"errors":[{"message":"The request was cancelled.","extensions":{"code":"REQUEST_CANCELLED"}}]}"#
    );
    let events = recorder.events();
    assert!(events.contains(&"catalog finished".to_string()));
    assert!(!events.contains(&"pricing finished".to_string()));
}

#[tokio::test]
async fn already_cancelled_requests_dispatch_nothing() {
    init_logger();
    let schema = plain_split();
    let recorder = SourceRecorder::default();
    let executors = SourceSchemaExecutorMap::new()
        .with_executor("catalog", recorder.source("catalog", r#"{"data":{}}"#))
        .with_executor("pricing", recorder.source("pricing", r#"{"data":{}}"#));
    let token = CancellationToken::new();
    token.cancel();

    let request = ExecutionRequest::new(r#"{ product(id: "1") { id price } }"#);
    let response = execute_operation(&schema, &executors, &request, &token).await;

    assert_eq!(response.state, RequestState::Cancelled);
    assert!(response.data.is_none());
    assert!(recorder.events().is_empty());
}
