//! Dual-channel stream renderer.
//!
//! Consumes a [`StreamEvent`] sequence and incrementally renders the two
//! logical outputs — the visible answer and the model reasoning — while
//! surfacing transient-retry and terminal-error notices. The answer
//! channel is the authoritative output feeding the next pipeline stage;
//! the reasoning channel is advisory only and is delivered exclusively
//! through the UI channel.

use prd_protocol::{StreamEvent, UiEvent};
use tokio::sync::mpsc::Sender;
use tokio_stream::{Stream, StreamExt};

/// Appended to the streaming answer to signal "still generating".
/// Stripped from the final emitted value.
pub const CURSOR_MARKER: &str = " ▌";

/// The result of rendering one streaming call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// The accumulated answer text, cursor marker stripped.
    pub answer: String,

    /// True iff the answer is non-empty and the call neither failed nor
    /// was cancelled.
    pub succeeded: bool,

    /// Terminal error message, if any.
    pub error: Option<String>,

    /// Whether the call ended through user cancellation.
    pub cancelled: bool,
}

impl RenderOutcome {
    /// The answer if the call fully succeeded.
    pub fn success_text(&self) -> Option<&str> {
        if self.succeeded {
            Some(&self.answer)
        } else {
            None
        }
    }
}

/// Render one event sequence to the UI channel.
///
/// Fragments are consumed in delivery order and concatenated; a `Retry`
/// event discards both accumulators, since a retried attempt redelivers
/// all tokens from the beginning.
pub async fn render_stream<S>(events: S, ui_tx: &Sender<UiEvent>) -> RenderOutcome
where
    S: Stream<Item = StreamEvent>,
{
    let mut answer = String::new();
    let mut reasoning = String::new();
    let mut error: Option<String> = None;
    let mut cancelled = false;

    tokio::pin!(events);

    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Text(fragment) => {
                answer.push_str(&fragment);
                let _ = ui_tx
                    .send(UiEvent::Answer {
                        text: format!("{answer}{CURSOR_MARKER}"),
                    })
                    .await;
            }
            StreamEvent::Thinking(fragment) => {
                reasoning.push_str(&fragment);
                let _ = ui_tx
                    .send(UiEvent::Reasoning {
                        text: reasoning.clone(),
                    })
                    .await;
            }
            StreamEvent::Retry(notice) => {
                // The next attempt starts over; partial text would
                // otherwise be duplicated.
                answer.clear();
                reasoning.clear();
                let _ = ui_tx.send(UiEvent::Notice { text: notice }).await;
            }
            StreamEvent::Error(message) => {
                let _ = ui_tx
                    .send(UiEvent::Failure {
                        text: format!("❌ API调用失败: {message}"),
                    })
                    .await;
                error = Some(message);
                break;
            }
            StreamEvent::Stopped(_) => {
                cancelled = true;
                let _ = ui_tx
                    .send(UiEvent::Notice {
                        text: "⏹️ 生成已中止".to_string(),
                    })
                    .await;
                break;
            }
        }
    }

    // Final value, without the cursor marker.
    if !answer.is_empty() {
        let _ = ui_tx
            .send(UiEvent::AnswerComplete {
                text: answer.clone(),
            })
            .await;
    }

    let succeeded = !answer.is_empty() && error.is_none() && !cancelled;

    RenderOutcome {
        answer,
        succeeded,
        error,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    async fn drain(rx: &mut mpsc::Receiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_accumulates_answer_in_order() {
        let (tx, mut rx) = mpsc::channel(32);
        let events = tokio_stream::iter(vec![
            StreamEvent::Text("1、".to_string()),
            StreamEvent::Text("功能概述".to_string()),
        ]);

        let outcome = render_stream(events, &tx).await;

        assert_eq!(outcome.answer, "1、功能概述");
        assert!(outcome.succeeded);
        assert!(outcome.error.is_none());
        assert!(!outcome.cancelled);

        let ui = drain(&mut rx).await;
        assert_eq!(
            ui[0],
            UiEvent::Answer {
                text: format!("1、{CURSOR_MARKER}")
            }
        );
        assert_eq!(
            ui.last(),
            Some(&UiEvent::AnswerComplete {
                text: "1、功能概述".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_reasoning_is_side_channel_only() {
        let (tx, mut rx) = mpsc::channel(32);
        let events = tokio_stream::iter(vec![
            StreamEvent::Thinking("想".to_string()),
            StreamEvent::Thinking("一想".to_string()),
            StreamEvent::Text("答案".to_string()),
        ]);

        let outcome = render_stream(events, &tx).await;
        assert_eq!(outcome.answer, "答案");

        let ui = drain(&mut rx).await;
        assert_eq!(
            ui[1],
            UiEvent::Reasoning {
                text: "想一想".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_retry_discards_partial_accumulation() {
        let (tx, _rx) = mpsc::channel(32);
        let events = tokio_stream::iter(vec![
            StreamEvent::Text("旧的部分".to_string()),
            StreamEvent::Thinking("旧思考".to_string()),
            StreamEvent::Retry("重试中".to_string()),
            StreamEvent::Text("新结果".to_string()),
        ]);

        let outcome = render_stream(events, &tx).await;
        assert_eq!(outcome.answer, "新结果");
        assert!(outcome.succeeded);
    }

    #[tokio::test]
    async fn test_error_stops_consumption() {
        let (tx, mut rx) = mpsc::channel(32);
        let events = tokio_stream::iter(vec![
            StreamEvent::Text("部分".to_string()),
            StreamEvent::Error("invalid API key".to_string()),
            // Never consumed:
            StreamEvent::Text("之后".to_string()),
        ]);

        let outcome = render_stream(events, &tx).await;
        assert_eq!(outcome.answer, "部分");
        assert!(!outcome.succeeded);
        assert_eq!(outcome.error.as_deref(), Some("invalid API key"));

        let ui = drain(&mut rx).await;
        assert!(ui
            .iter()
            .any(|e| matches!(e, UiEvent::Failure { text } if text.contains("invalid API key"))));
        // Partial text is retained and re-emitted without the marker.
        assert_eq!(
            ui.last(),
            Some(&UiEvent::AnswerComplete {
                text: "部分".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_cancellation_preserves_partial_text() {
        let (tx, _rx) = mpsc::channel(32);
        let events = tokio_stream::iter(vec![
            StreamEvent::Text("第一".to_string()),
            StreamEvent::Text("第二".to_string()),
            StreamEvent::Stopped("用户已中止生成".to_string()),
        ]);

        let outcome = render_stream(events, &tx).await;
        assert_eq!(outcome.answer, "第一第二");
        assert!(!outcome.succeeded);
        assert!(outcome.cancelled);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_stream_is_not_success() {
        let (tx, mut rx) = mpsc::channel(32);
        let events = tokio_stream::iter(Vec::<StreamEvent>::new());

        let outcome = render_stream(events, &tx).await;
        assert!(!outcome.succeeded);
        assert!(outcome.answer.is_empty());
        assert!(drain(&mut rx).await.is_empty());
    }
}
