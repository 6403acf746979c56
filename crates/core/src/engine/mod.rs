//! Streaming call engine.
//!
//! The engine turns a single logical generation request into a resumable,
//! cancellable, retried stream of typed [`StreamEvent`]s. Transient backend
//! failures are retried with exponential backoff; everything else ends the
//! stream with one terminal `Error` event. Cancellation is cooperative and
//! checked at chunk granularity, never mid-chunk.

pub mod cancel;
pub mod renderer;

pub use cancel::CancelFlag;
pub use renderer::{render_stream, RenderOutcome, CURSOR_MARKER};

use crate::backend::{Backend, BackendError, Fragment};
use async_stream::stream;
use prd_protocol::{GenerationRequest, StreamEvent, UiEvent};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio_stream::{Stream, StreamExt};

/// Total attempts per logical call (one initial try plus two retries).
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff starts here and doubles per retry.
const INITIAL_RETRY_DELAY_SECS: u64 = 5;

/// Backoff cap.
const MAX_RETRY_DELAY_SECS: u64 = 30;

/// Notice payload of a `Stopped` event.
pub const STOPPED_NOTICE: &str = "用户已中止生成";

/// Whether the model's identifier indicates reasoning support.
///
/// Capability detection, not an error condition: the thinking budget is
/// simply omitted for models that would reject it.
pub fn supports_reasoning(model_id: &str) -> bool {
    model_id.contains("2.5") || model_id.to_lowercase().contains("think")
}

/// The retry notice shown while waiting out a transient failure.
fn retry_notice(error: &BackendError, delay_secs: u64, remaining: u32) -> String {
    let text = error.to_string();
    let brief: String = text.chars().take(50).collect();
    format!(
        "⚠️ 服务暂时不可用 ({brief}...)，{delay_secs}秒后自动重试（剩余{remaining}次）..."
    )
}

/// The streaming call engine.
///
/// Wraps a [`Backend`] and produces finite, non-restartable event
/// sequences; each `stream` call creates a fresh sequence. The engine has
/// no side effects beyond emitting events and does not render anything
/// itself.
pub struct StreamingEngine {
    backend: Arc<dyn Backend>,
}

impl StreamingEngine {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Issue one generation call and stream its typed events.
    ///
    /// The returned sequence ends after the backend completes, after a
    /// single terminal `Error` event, or after a single `Stopped` event
    /// when `cancel` is observed. A retried attempt re-sends the full
    /// request and redelivers all fragments from the beginning.
    pub fn stream(
        &self,
        request: GenerationRequest,
        cancel: CancelFlag,
    ) -> Pin<Box<dyn Stream<Item = StreamEvent> + Send>> {
        let backend = Arc::clone(&self.backend);
        let request = effective_request(request);

        Box::pin(stream! {
            let mut retry_delay = INITIAL_RETRY_DELAY_SECS;
            let mut attempt = 1u32;

            loop {
                // A cancel requested during backoff (or before the first
                // attempt) stops before touching the backend again.
                if cancel.take() {
                    yield StreamEvent::Stopped(STOPPED_NOTICE.to_string());
                    return;
                }

                let mut failure = match backend.issue(&request).await {
                    Ok(mut fragments) => {
                        let mut failure = None;
                        loop {
                            // Polled before each delivered chunk; buffered
                            // chunks past this point are discarded.
                            if cancel.take() {
                                yield StreamEvent::Stopped(STOPPED_NOTICE.to_string());
                                return;
                            }

                            match fragments.next().await {
                                Some(Ok(Fragment::Text(text))) => {
                                    yield StreamEvent::Text(text);
                                }
                                Some(Ok(Fragment::Reasoning(text))) => {
                                    yield StreamEvent::Thinking(text);
                                }
                                Some(Err(error)) => {
                                    failure = Some(error);
                                    break;
                                }
                                None => return,
                            }
                        }
                        failure
                    }
                    Err(error) => Some(error),
                };

                // `failure` is always Some here; the success path returned.
                if let Some(error) = failure.take() {
                    if error.is_transient() && attempt < MAX_ATTEMPTS {
                        let remaining = MAX_ATTEMPTS - attempt;
                        tracing::warn!(
                            attempt,
                            delay_secs = retry_delay,
                            "transient backend failure, retrying: {error}"
                        );
                        yield StreamEvent::Retry(retry_notice(&error, retry_delay, remaining));
                        tokio::time::sleep(Duration::from_secs(retry_delay)).await;
                        retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY_SECS);
                        attempt += 1;
                        continue;
                    }

                    tracing::error!("terminal backend failure: {error}");
                    yield StreamEvent::Error(error.to_string());
                    return;
                }
            }
        })
    }

    /// Issue one call and render it to the UI channel in a single step.
    ///
    /// This is the building block every pipeline stage uses: stream the
    /// events, feed the dual-channel renderer, return the outcome.
    pub async fn call_and_render(
        &self,
        request: GenerationRequest,
        cancel: CancelFlag,
        ui_tx: &Sender<UiEvent>,
    ) -> RenderOutcome {
        let events = self.stream(request, cancel);
        render_stream(events, ui_tx).await
    }
}

/// Strip the reasoning budget for models that do not support it.
fn effective_request(mut request: GenerationRequest) -> GenerationRequest {
    if !supports_reasoning(&request.model_id) {
        request.reasoning_budget = None;
    }
    request
}
