//! Integration tests for the streaming call engine's retry and
//! cancellation behavior.

mod common;

use common::mock_backends::CancellingBackend;
use prd_core::backend::adapters::mock::{CallScript, MockBackend};
use prd_core::backend::{Backend, BackendError, Fragment};
use prd_core::engine::{render_stream, CancelFlag, StreamingEngine};
use prd_protocol::{GenerationRequest, StreamEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

fn request() -> GenerationRequest {
    GenerationRequest::new("功能描述: 好友系统", "gemini-2.0-flash")
}

/// A backend that always raises a transient error must produce exactly
/// two retry notices followed by one terminal error, with non-decreasing
/// backoff delays.
#[tokio::test(start_paused = true)]
async fn test_retry_bounds_and_backoff_delays() {
    let backend = Arc::new(MockBackend::failing_every_call(BackendError::Api(
        "503 model is overloaded".to_string(),
    )));
    let engine = StreamingEngine::new(Arc::clone(&backend) as Arc<dyn Backend>);

    let events: Vec<_> = engine.stream(request(), CancelFlag::new()).collect().await;

    let retries = events
        .iter()
        .filter(|event| matches!(event, StreamEvent::Retry(_)))
        .count();
    assert_eq!(retries, 2, "exactly two retry notices expected");
    assert_eq!(events.len(), 3);
    assert!(
        matches!(events.last(), Some(StreamEvent::Error(_))),
        "stream must end with a single terminal error"
    );

    // Three total attempts, spaced by the backoff schedule (5s, then 10s).
    let instants = backend.call_instants();
    assert_eq!(instants.len(), 3);
    let first_gap = instants[1] - instants[0];
    let second_gap = instants[2] - instants[1];
    assert_eq!(first_gap, Duration::from_secs(5));
    assert_eq!(second_gap, Duration::from_secs(10));
    assert!(second_gap >= first_gap, "delays must be non-decreasing");
}

/// The backoff doubles but never exceeds the cap; a success on the final
/// attempt ends the stream normally.
#[tokio::test(start_paused = true)]
async fn test_transient_failures_then_success() {
    let backend = Arc::new(MockBackend::scripted(vec![
        CallScript::ConnectError(BackendError::Api("429 rate limit".to_string())),
        CallScript::ConnectError(BackendError::Api("RESOURCE_EXHAUSTED".to_string())),
        CallScript::Fragments(vec![Ok(Fragment::Text("终于成功".to_string()))]),
    ]));
    let engine = StreamingEngine::new(Arc::clone(&backend) as Arc<dyn Backend>);

    let events: Vec<_> = engine.stream(request(), CancelFlag::new()).collect().await;

    assert!(matches!(events[0], StreamEvent::Retry(_)));
    assert!(matches!(events[1], StreamEvent::Retry(_)));
    assert_eq!(events[2], StreamEvent::Text("终于成功".to_string()));
    assert_eq!(events.len(), 3);
    assert_eq!(backend.call_count(), 3);
}

/// Cancellation after N delivered chunks preserves exactly those chunks.
#[tokio::test]
async fn test_cancellation_preserves_exactly_delivered_chunks() {
    let cancel = CancelFlag::new();
    let backend = Arc::new(CancellingBackend::new(
        vec![
            Fragment::Text("一".to_string()),
            Fragment::Text("二".to_string()),
            Fragment::Text("三".to_string()),
            Fragment::Text("四".to_string()),
        ],
        2,
        cancel.clone(),
    ));
    let engine = StreamingEngine::new(Arc::clone(&backend) as Arc<dyn Backend>);

    let (tx, _rx) = mpsc::channel(64);
    let events = engine.stream(request(), cancel.clone());
    let outcome = render_stream(events, &tx).await;

    assert_eq!(outcome.answer, "一二");
    assert!(!outcome.succeeded);
    assert!(outcome.cancelled);
    assert!(outcome.error.is_none());
    // The flag was cleared when observed.
    assert!(!cancel.is_set());
    assert_eq!(backend.call_count(), 1);
}

/// The stream ends with exactly one Stopped event on cancellation.
#[tokio::test]
async fn test_stopped_is_terminal_event() {
    let cancel = CancelFlag::new();
    let backend = Arc::new(CancellingBackend::new(
        vec![
            Fragment::Reasoning("想".to_string()),
            Fragment::Text("答".to_string()),
        ],
        2,
        cancel.clone(),
    ));
    let engine = StreamingEngine::new(backend);

    let events: Vec<_> = engine.stream(request(), cancel).collect().await;

    assert_eq!(
        events.last(),
        Some(&StreamEvent::Stopped("用户已中止生成".to_string()))
    );
    let stopped = events
        .iter()
        .filter(|event| matches!(event, StreamEvent::Stopped(_)))
        .count();
    assert_eq!(stopped, 1);
}
