//! Mock backend implementations for deterministic testing.

use async_trait::async_trait;
use prd_core::backend::{Backend, BackendError, Fragment, FragmentStream};
use prd_protocol::GenerationRequest;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Behavior of one matched call on a [`RoutedBackend`].
#[derive(Clone)]
pub enum Script {
    /// Stream the text as a single fragment.
    Reply(String),

    /// Fail the call before any fragment.
    Fail(BackendError),

    /// Stream an empty sequence (produces an unsuccessful render).
    Empty,

    /// Stream the text, then trip the cancel flag as the stream ends.
    /// The call itself completes; cancellation is observed at the next
    /// polling boundary (e.g. before the following reflection round).
    ReplyThenCancel(String, prd_core::engine::CancelFlag),

    /// Consume one inner script per call, repeating the last when drained.
    Sequence(Arc<Mutex<VecDeque<Script>>>),
}

impl Script {
    /// A per-call sequence of scripts.
    pub fn sequence(scripts: Vec<Script>) -> Script {
        Script::Sequence(Arc::new(Mutex::new(scripts.into())))
    }

    fn resolve(&self) -> Script {
        match self {
            Script::Sequence(queue) => {
                let mut queue = queue.lock().expect("sequence lock");
                if queue.len() > 1 {
                    queue.pop_front().expect("non-empty queue")
                } else {
                    // Keep the last entry so further calls repeat it.
                    queue.front().cloned().unwrap_or(Script::Empty)
                }
            }
            other => other.clone(),
        }
    }
}

/// A backend that answers each call by routing on the system instruction,
/// so one instance can drive a whole multi-stage pipeline.
///
/// Routes are matched by substring against the request's system
/// instruction, in registration order; the fallback covers everything
/// else.
pub struct RoutedBackend {
    routes: Vec<(String, Script)>,
    fallback: Script,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl RoutedBackend {
    pub fn new(fallback: Script) -> Self {
        Self {
            routes: Vec::new(),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Route calls whose system instruction contains `marker`.
    pub fn route(mut self, marker: &str, script: Script) -> Self {
        self.routes.push((marker.to_string(), script));
        self
    }

    /// All requests observed, in call order.
    pub fn captured_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    fn script_for(&self, request: &GenerationRequest) -> Script {
        let instruction = request.system_instruction.as_deref().unwrap_or("");
        for (marker, script) in &self.routes {
            if instruction.contains(marker.as_str()) {
                return script.resolve();
            }
        }
        self.fallback.resolve()
    }
}

#[async_trait]
impl Backend for RoutedBackend {
    async fn check_availability(&self) -> bool {
        true
    }

    async fn issue(&self, request: &GenerationRequest) -> Result<FragmentStream, BackendError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        match self.script_for(request) {
            Script::Fail(error) => Err(error),
            Script::Reply(text) => {
                Ok(Box::pin(tokio_stream::iter(vec![Ok(Fragment::Text(text))])))
            }
            Script::Empty => Ok(Box::pin(tokio_stream::iter(Vec::new()))),
            Script::ReplyThenCancel(text, cancel) => {
                let stream = async_stream::stream! {
                    yield Ok(Fragment::Text(text));
                    cancel.set();
                };
                Ok(Box::pin(stream))
            }
            Script::Sequence(_) => unreachable!("resolve() flattens sequences"),
        }
    }
}

/// A backend that delivers fragments and trips the cancel flag partway
/// through, emulating a user pressing stop mid-stream.
pub struct CancellingBackend {
    fragments: Vec<Fragment>,
    cancel_after: usize,
    cancel: prd_core::engine::CancelFlag,
    calls: AtomicUsize,
}

impl CancellingBackend {
    pub fn new(
        fragments: Vec<Fragment>,
        cancel_after: usize,
        cancel: prd_core::engine::CancelFlag,
    ) -> Self {
        Self {
            fragments,
            cancel_after,
            cancel,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for CancellingBackend {
    async fn check_availability(&self) -> bool {
        true
    }

    async fn issue(&self, _request: &GenerationRequest) -> Result<FragmentStream, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let fragments = self.fragments.clone();
        let cancel_after = self.cancel_after;
        let cancel = self.cancel.clone();

        let stream = async_stream::stream! {
            for (index, fragment) in fragments.into_iter().enumerate() {
                yield Ok(fragment);
                if index + 1 == cancel_after {
                    cancel.set();
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
