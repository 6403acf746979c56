//! Streaming call models.
//!
//! This module defines the atomic event type produced by the streaming
//! call engine and the immutable request value object it consumes.

use serde::{Deserialize, Serialize};

/// One event in the incremental output of a streaming generation call.
///
/// `Text` and `Thinking` events carry incremental fragments (never the
/// cumulative text) and may interleave in any order. If a `Stopped` or
/// `Error` event occurs, it is the last event of the stream.
///
/// Uses tagged enum serialization:
/// ```json
/// { "type": "text", "payload": "片段" }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum StreamEvent {
    /// An incremental fragment of the visible answer.
    Text(String),

    /// An incremental fragment of the model's reasoning channel.
    Thinking(String),

    /// A transient failure is being retried; payload is a human-readable
    /// notice describing the wait. Generation continues.
    Retry(String),

    /// A terminal failure; payload is the raw failure text. Ends the stream.
    Error(String),

    /// The user cancelled generation. Ends the stream.
    Stopped(String),
}

/// An immutable value object describing one generation call.
///
/// Constructed fresh for every call and never mutated. The prompt is
/// required; callers validate non-emptiness before construction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// The composed user prompt.
    pub prompt: String,

    /// Optional system instruction fixing the model's role for this call.
    #[serde(default)]
    pub system_instruction: Option<String>,

    /// Identifier of the backend model to call.
    pub model_id: String,

    /// Optional thinking-token budget.
    ///
    /// Only honored by models whose identifier indicates reasoning
    /// support; the engine strips it for other models.
    #[serde(default)]
    pub reasoning_budget: Option<u32>,
}

impl GenerationRequest {
    /// Create a new request for the given prompt and model.
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            model_id: model_id.into(),
            reasoning_budget: None,
        }
    }

    /// Set the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set the thinking-token budget.
    pub fn with_reasoning_budget(mut self, budget: u32) -> Self {
        self.reasoning_budget = Some(budget);
        self
    }
}
