//! Generate pipeline controller (Pipeline A).
//!
//! `Idle → Generating → Checking → Done`. The generating stage produces
//! the document body under the ten-section instruction; the checking stage
//! runs the checklist self-check over it. A failed self-check does not
//! invalidate the already-produced document — the check result is simply
//! left empty.

use crate::engine::StreamingEngine;
use crate::history::HistoryStore;
use crate::pipeline::error::PipelineError;
use crate::pipeline::stage::{cancel_stage, complete_stage, fail_stage, start_stage};
use crate::pipeline::{request_for, run_self_check, AttachmentText, RunOutcome};
use crate::session::SessionContext;
use prd_protocol::{DownloadBlob, FeatureKind, PipelineStage, UiEvent};
use std::collections::BTreeMap;
use tokio::sync::mpsc::Sender;

/// Pipeline A states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateState {
    Idle,
    Generating,
    Checking,
    Done,
}

/// Controller for the 生成策划案 flow.
pub struct GenerateController {
    state: GenerateState,
    input_description: String,
    document: String,
    check_report: String,
    stages: Vec<PipelineStage>,
    recorded: bool,
}

impl GenerateController {
    pub fn new() -> Self {
        Self {
            state: GenerateState::Idle,
            input_description: String::new(),
            document: String::new(),
            check_report: String::new(),
            stages: Vec::new(),
            recorded: false,
        }
    }

    pub fn state(&self) -> GenerateState {
        self.state
    }

    /// The produced document body (possibly partial after cancellation).
    pub fn document(&self) -> &str {
        &self.document
    }

    /// The self-check report; empty when the check stage failed.
    pub fn check_report(&self) -> Option<&str> {
        if self.check_report.is_empty() {
            None
        } else {
            Some(&self.check_report)
        }
    }

    /// Stages of the most recent run, in execution order.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Run the pipeline for one user submission.
    ///
    /// Resets any prior stage outputs and the cancellation flag, then
    /// drives the two stages to a terminal state. Backend failures and
    /// cancellation are reported through the returned outcome, never as
    /// errors.
    pub async fn submit(
        &mut self,
        engine: &StreamingEngine,
        session: &mut SessionContext,
        user_input: &str,
        attachment: Option<&AttachmentText>,
        ui_tx: &Sender<UiEvent>,
    ) -> Result<RunOutcome, PipelineError> {
        let user_input = user_input.trim();
        if user_input.is_empty() {
            return Err(PipelineError::EmptyInput("功能描述".to_string()));
        }

        // Reset prior outputs and the cancellation flag.
        self.input_description = user_input.to_string();
        self.document.clear();
        self.check_report.clear();
        self.stages.clear();
        self.recorded = false;
        session.cancel.clear();

        // -- Generating --------------------------------------------------
        self.state = GenerateState::Generating;
        let composed = compose_input(user_input, attachment);
        let prompt = format!("请根据以下功能描述生成完整的策划案：\n\n{composed}");

        let mut stage = PipelineStage::new("generating", composed);
        start_stage(&mut stage, ui_tx).await;

        let request = request_for(session, prompt, &session.prompts.generate);
        let outcome = engine
            .call_and_render(request, session.cancel.clone(), ui_tx)
            .await;

        if outcome.cancelled {
            // Partial results are preserved, not discarded.
            self.document = outcome.answer.clone();
            cancel_stage(&mut stage, Some(outcome.answer), ui_tx).await;
            self.stages.push(stage);
            self.state = GenerateState::Idle;
            return Ok(RunOutcome::Cancelled);
        }

        if let Some(error) = outcome.error {
            fail_stage(&mut stage, ui_tx).await;
            self.stages.push(stage);
            self.state = GenerateState::Idle;
            return Ok(RunOutcome::Failed(error));
        }

        if !outcome.succeeded {
            fail_stage(&mut stage, ui_tx).await;
            self.stages.push(stage);
            self.state = GenerateState::Idle;
            return Ok(RunOutcome::Failed("生成结果为空".to_string()));
        }

        self.document = outcome.answer.clone();
        complete_stage(&mut stage, outcome.answer, ui_tx).await;
        self.stages.push(stage);

        // -- Checking ----------------------------------------------------
        // Non-fatal regardless of outcome: the document stands on its own.
        self.state = GenerateState::Checking;
        let (check_stage, report) =
            run_self_check(engine, session, &self.document, "checking", ui_tx).await;
        self.stages.push(check_stage);
        self.check_report = report;

        self.state = GenerateState::Done;
        Ok(RunOutcome::Completed)
    }

    /// Append exactly one history record for the finished run.
    ///
    /// Idempotent: repeated calls on an already-`Done` state are no-ops
    /// until the next submission resets the flag. Returns the new record
    /// id on the first call.
    pub fn record_history(
        &mut self,
        history: &mut HistoryStore,
        download: Option<DownloadBlob>,
    ) -> Option<u64> {
        if self.state != GenerateState::Done || self.recorded {
            return None;
        }
        self.recorded = true;

        let mut inputs = BTreeMap::new();
        inputs.insert("功能描述".to_string(), self.input_description.clone());
        Some(history.record(
            FeatureKind::GeneratePrd,
            inputs,
            self.document.clone(),
            download,
        ))
    }
}

impl Default for GenerateController {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the user description with extracted attachment text under the
/// labeled two-section template.
fn compose_input(user_input: &str, attachment: Option<&AttachmentText>) -> String {
    match attachment {
        Some(attachment) => format!(
            "【用户功能描述】\n{user_input}\n\n【附件内容】（文件名: {}）\n{}\n\n\
             请参考以上功能描述和附件内容，生成完整的策划案。",
            attachment.name, attachment.content
        ),
        None => user_input.to_string(),
    }
}
