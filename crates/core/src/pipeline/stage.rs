//! Stage state machine implementation.
//!
//! This module provides functions for managing the lifecycle of a
//! [`PipelineStage`], including state transitions and event emission.

use prd_protocol::{PipelineStage, StageStatus, UiEvent};
use tokio::sync::mpsc::Sender;

/// Transition the stage to Running and emit an event.
pub async fn start_stage(stage: &mut PipelineStage, ui_tx: &Sender<UiEvent>) {
    debug_assert_eq!(stage.status, StageStatus::Pending);
    stage.status = StageStatus::Running;
    tracing::debug!(stage = %stage.name, "stage started");
    let _ = ui_tx
        .send(UiEvent::StageStarted {
            name: stage.name.clone(),
        })
        .await;
}

/// Mark the stage as completed with its produced output and emit an event.
///
/// Completion requires non-empty output; callers route empty results
/// through [`fail_stage`] instead.
pub async fn complete_stage(stage: &mut PipelineStage, output: String, ui_tx: &Sender<UiEvent>) {
    debug_assert_eq!(stage.status, StageStatus::Running);
    debug_assert!(!output.is_empty());
    stage.output = Some(output);
    stage.status = StageStatus::Completed;
    finish(stage, ui_tx).await;
}

/// Mark the stage as failed and emit an event.
pub async fn fail_stage(stage: &mut PipelineStage, ui_tx: &Sender<UiEvent>) {
    debug_assert_eq!(stage.status, StageStatus::Running);
    stage.status = StageStatus::Failed;
    finish(stage, ui_tx).await;
}

/// Mark the stage as cancelled, retaining any partial output, and emit an
/// event.
pub async fn cancel_stage(
    stage: &mut PipelineStage,
    partial: Option<String>,
    ui_tx: &Sender<UiEvent>,
) {
    debug_assert_eq!(stage.status, StageStatus::Running);
    stage.output = partial.filter(|text| !text.is_empty());
    stage.status = StageStatus::Cancelled;
    finish(stage, ui_tx).await;
}

async fn finish(stage: &PipelineStage, ui_tx: &Sender<UiEvent>) {
    tracing::debug!(stage = %stage.name, status = ?stage.status, "stage finished");
    let _ = ui_tx
        .send(UiEvent::StageFinished {
            name: stage.name.clone(),
            status: stage.status,
        })
        .await;
}
