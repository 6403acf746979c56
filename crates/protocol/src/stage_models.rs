//! Pipeline stage state models.
//!
//! This module defines the structures for tracking one step of a
//! multi-stage document-refinement flow.

use serde::{Deserialize, Serialize};

/// Represents the current lifecycle status of a pipeline stage.
///
/// A stage transitions `Pending -> Running -> {Completed|Failed|Cancelled}`
/// exactly once.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    /// Stage has been created but not started yet.
    Pending,

    /// Stage is actively executing.
    Running,

    /// Stage has completed successfully with non-empty output.
    Completed,

    /// Stage encountered a terminal error.
    Failed,

    /// Stage was cancelled by the user; may carry partial output.
    Cancelled,
}

impl StageStatus {
    /// Whether this status is a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StageStatus::Completed | StageStatus::Failed | StageStatus::Cancelled
        )
    }
}

/// One step of a multi-stage document-refinement flow.
///
/// A stage's `input` is always either raw user input or another stage's
/// `output` (strict DAG, no cycles).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PipelineStage {
    /// Stage name, e.g. "generating", "checking", "reflection-round-2".
    pub name: String,

    /// The prior stage's output or the user's composed input.
    pub input: String,

    /// The stage's produced text; None until the stage completes or is
    /// cancelled with partial output.
    pub output: Option<String>,

    /// Current lifecycle status.
    pub status: StageStatus,
}

impl PipelineStage {
    /// Create a new stage in `Pending` status.
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: None,
            status: StageStatus::Pending,
        }
    }
}
