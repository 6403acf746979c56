//! Mock backend implementation for testing.

use crate::backend::base::{Backend, BackendError, Fragment, FragmentStream};
use async_trait::async_trait;
use prd_protocol::GenerationRequest;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// Behavior of one `issue` call on a [`MockBackend`].
#[derive(Debug, Clone)]
pub enum CallScript {
    /// The call opens a stream that yields these items in order.
    Fragments(Vec<Result<Fragment, BackendError>>),

    /// The call fails before any fragment is delivered.
    ConnectError(BackendError),
}

/// Scripted backend for deterministic tests.
///
/// Each `issue` call consumes the next script; once the scripts run out,
/// the last one repeats. Calls are recorded together with their arrival
/// instants so tests can assert on retry timing and on capability gating
/// of the effective request.
pub struct MockBackend {
    scripts: Mutex<VecDeque<CallScript>>,
    last: Mutex<Option<CallScript>>,
    calls: Mutex<Vec<Instant>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockBackend {
    pub fn scripted(scripts: Vec<CallScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A backend where every call succeeds with the given answer fragments.
    pub fn succeeding(fragments: Vec<Fragment>) -> Self {
        Self::scripted(vec![CallScript::Fragments(
            fragments.into_iter().map(Ok).collect(),
        )])
    }

    /// A backend where every call yields the full document as one fragment.
    pub fn responding_with(text: impl Into<String>) -> Self {
        Self::succeeding(vec![Fragment::Text(text.into())])
    }

    /// A backend where every call fails before delivering anything.
    pub fn failing_every_call(error: BackendError) -> Self {
        Self::scripted(vec![CallScript::ConnectError(error)])
    }

    /// Instants at which `issue` was called.
    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }

    /// Requests captured from each `issue` call.
    pub fn captured_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock lock poisoned").len()
    }

    fn next_script(&self) -> CallScript {
        let mut scripts = self.scripts.lock().expect("mock lock poisoned");
        let mut last = self.last.lock().expect("mock lock poisoned");
        if let Some(script) = scripts.pop_front() {
            *last = Some(script.clone());
            script
        } else {
            last.clone()
                .unwrap_or(CallScript::Fragments(Vec::new()))
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn check_availability(&self) -> bool {
        true
    }

    async fn issue(&self, request: &GenerationRequest) -> Result<FragmentStream, BackendError> {
        self.calls
            .lock()
            .expect("mock lock poisoned")
            .push(Instant::now());
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request.clone());

        match self.next_script() {
            CallScript::ConnectError(error) => Err(error),
            CallScript::Fragments(items) => Ok(Box::pin(tokio_stream::iter(items))),
        }
    }
}
