//! Optimize pipeline controller (Pipeline B).
//!
//! `Idle → InitialFix → Reflection(1..=N) → FinalCheck → Done`. Each
//! reflection round is a critique-then-fix pair of sub-calls sharing one
//! current-document variable. Splitting critique and fix into separate
//! calls keeps each prompt single-purpose and makes partial failure
//! recoverable at round granularity: one bad response loses a round, not
//! the whole session.

use crate::engine::StreamingEngine;
use crate::history::HistoryStore;
use crate::pipeline::error::PipelineError;
use crate::pipeline::stage::{cancel_stage, complete_stage, fail_stage, start_stage};
use crate::pipeline::{request_for, run_self_check, AttachmentText, RunOutcome};
use crate::session::SessionContext;
use prd_protocol::{DownloadBlob, FeatureKind, PipelineStage, UiEvent};
use std::collections::BTreeMap;
use tokio::sync::mpsc::Sender;

/// Reflection rounds are clamped into this range.
const MIN_ROUNDS: u32 = 1;
const MAX_ROUNDS: u32 = 10;

/// Pipeline B states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeState {
    Idle,
    InitialFix,
    Reflection,
    FinalCheck,
    Done,
}

/// Controller for the 优化策划案 flow.
pub struct OptimizeController {
    state: OptimizeState,
    feedback: String,
    requested_rounds: u32,
    document: String,
    check_report: String,
    stages: Vec<PipelineStage>,
    rounds_completed: u32,
    recorded: bool,
}

impl OptimizeController {
    pub fn new() -> Self {
        Self {
            state: OptimizeState::Idle,
            feedback: String::new(),
            requested_rounds: 0,
            document: String::new(),
            check_report: String::new(),
            stages: Vec::new(),
            rounds_completed: 0,
            recorded: false,
        }
    }

    pub fn state(&self) -> OptimizeState {
        self.state
    }

    /// The current document (final after `Done`, possibly partial earlier).
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn check_report(&self) -> Option<&str> {
        if self.check_report.is_empty() {
            None
        } else {
            Some(&self.check_report)
        }
    }

    /// Rounds whose fix sub-call completed and replaced the document.
    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Run the optimize pipeline for one submission.
    pub async fn submit(
        &mut self,
        engine: &StreamingEngine,
        session: &mut SessionContext,
        old_prd: &str,
        feedback: &str,
        attachment: Option<&AttachmentText>,
        rounds: u32,
        ui_tx: &Sender<UiEvent>,
    ) -> Result<RunOutcome, PipelineError> {
        let old_prd = old_prd.trim();
        if old_prd.is_empty() {
            return Err(PipelineError::EmptyInput("旧策划案".to_string()));
        }
        let rounds = rounds.clamp(MIN_ROUNDS, MAX_ROUNDS);

        self.feedback = feedback.trim().to_string();
        self.requested_rounds = rounds;
        self.document.clear();
        self.check_report.clear();
        self.stages.clear();
        self.rounds_completed = 0;
        self.recorded = false;
        session.cancel.clear();

        let notes = compose_revision_notes(feedback, attachment);

        // -- InitialFix --------------------------------------------------
        self.state = OptimizeState::InitialFix;
        let prompt = format!(
            "【旧策划案】\n{old_prd}\n\n【用户修改意见】\n{notes}\n\n\
             请根据复检清单检查旧案，结合用户意见进行修改和填补。"
        );

        let mut stage = PipelineStage::new("initial-fix", old_prd);
        start_stage(&mut stage, ui_tx).await;

        let request = request_for(session, prompt, &session.prompts.initial_fix);
        let outcome = engine
            .call_and_render(request, session.cancel.clone(), ui_tx)
            .await;

        if outcome.cancelled {
            self.document = outcome.answer.clone();
            cancel_stage(&mut stage, Some(outcome.answer), ui_tx).await;
            self.stages.push(stage);
            self.state = OptimizeState::Idle;
            return Ok(RunOutcome::Cancelled);
        }

        if let Some(error) = outcome.error {
            fail_stage(&mut stage, ui_tx).await;
            self.stages.push(stage);
            self.state = OptimizeState::Idle;
            return Ok(RunOutcome::Failed(error));
        }

        if !outcome.succeeded {
            fail_stage(&mut stage, ui_tx).await;
            self.stages.push(stage);
            self.state = OptimizeState::Idle;
            return Ok(RunOutcome::Failed("生成结果为空".to_string()));
        }

        self.document = outcome.answer.clone();
        complete_stage(&mut stage, outcome.answer, ui_tx).await;
        self.stages.push(stage);

        // -- Reflection --------------------------------------------------
        self.state = OptimizeState::Reflection;
        let was_cancelled = self.run_reflection_loop(engine, session, rounds, ui_tx).await;

        // -- FinalCheck --------------------------------------------------
        // Reached even after mid-loop cancellation: the partial document
        // still gets its check rather than aborting the whole operation.
        self.state = OptimizeState::FinalCheck;
        let (check_stage, report) =
            run_self_check(engine, session, &self.document, "final-check", ui_tx).await;
        self.stages.push(check_stage);
        self.check_report = report;

        self.state = OptimizeState::Done;
        if was_cancelled {
            Ok(RunOutcome::Cancelled)
        } else {
            Ok(RunOutcome::Completed)
        }
    }

    /// Drive up to `rounds` critique/fix pairs. Returns whether the loop
    /// stopped on cancellation.
    async fn run_reflection_loop(
        &mut self,
        engine: &StreamingEngine,
        session: &SessionContext,
        rounds: u32,
        ui_tx: &Sender<UiEvent>,
    ) -> bool {
        for round in 1..=rounds {
            // Checked before each round begins.
            if session.cancel.take() {
                return true;
            }

            let _ = ui_tx.send(UiEvent::RoundStarted { index: round }).await;

            // Critique sub-call: list problems only, never rewrite.
            let prompt = format!("请审查以下策划案，提出你的问题和疑虑：\n\n{}", self.document);
            let mut critique_stage = PipelineStage::new(
                format!("reflection-round-{round}-critique"),
                self.document.clone(),
            );
            start_stage(&mut critique_stage, ui_tx).await;

            let request = request_for(session, prompt, &session.prompts.critique);
            let outcome = engine
                .call_and_render(request, session.cancel.clone(), ui_tx)
                .await;

            if outcome.cancelled {
                cancel_stage(&mut critique_stage, Some(outcome.answer), ui_tx).await;
                self.stages.push(critique_stage);
                return true;
            }

            if !outcome.succeeded {
                // A failed critique is non-fatal: the document carries
                // over unchanged and the loop proceeds to the next round.
                fail_stage(&mut critique_stage, ui_tx).await;
                self.stages.push(critique_stage);
                tracing::warn!(round, "critique sub-call failed, skipping round");
                let _ = ui_tx
                    .send(UiEvent::Notice {
                        text: format!("开发人员审查失败，跳过第 {round} 轮"),
                    })
                    .await;
                continue;
            }

            let critique = outcome.answer;
            complete_stage(&mut critique_stage, critique.clone(), ui_tx).await;
            self.stages.push(critique_stage);

            // Fix sub-call: apply the listed problems as revisions.
            let prompt = format!(
                "【当前策划案】\n{}\n\n【开发人员提出的问题】\n{critique}\n\n\
                 请针对以上问题修改和完善策划案。",
                self.document
            );
            let mut fix_stage =
                PipelineStage::new(format!("reflection-round-{round}-fix"), critique);
            start_stage(&mut fix_stage, ui_tx).await;

            let request = request_for(session, prompt, &session.prompts.fix);
            let outcome = engine
                .call_and_render(request, session.cancel.clone(), ui_tx)
                .await;

            if outcome.cancelled {
                // The partial rewrite is not trusted; the current document
                // is whatever the last completed fix produced.
                cancel_stage(&mut fix_stage, Some(outcome.answer), ui_tx).await;
                self.stages.push(fix_stage);
                return true;
            }

            if outcome.succeeded {
                self.document = outcome.answer.clone();
                self.rounds_completed += 1;
                complete_stage(&mut fix_stage, outcome.answer, ui_tx).await;
                self.stages.push(fix_stage);
            } else {
                fail_stage(&mut fix_stage, ui_tx).await;
                self.stages.push(fix_stage);
                tracing::warn!(round, "fix sub-call failed, keeping current document");
                let _ = ui_tx
                    .send(UiEvent::Notice {
                        text: "策划优化失败，保持当前版本".to_string(),
                    })
                    .await;
            }
        }

        false
    }

    /// Append exactly one history record for the finished run.
    pub fn record_history(
        &mut self,
        history: &mut HistoryStore,
        download: Option<DownloadBlob>,
    ) -> Option<u64> {
        if self.state != OptimizeState::Done || self.recorded {
            return None;
        }
        self.recorded = true;

        let mut inputs = BTreeMap::new();
        inputs.insert("修改意见".to_string(), self.feedback.clone());
        inputs.insert("迭代轮次".to_string(), self.requested_rounds.to_string());
        Some(history.record(
            FeatureKind::OptimizePrd,
            inputs,
            self.document.clone(),
            download,
        ))
    }
}

impl Default for OptimizeController {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge user feedback and attachment text into one revision-notes string.
fn compose_revision_notes(feedback: &str, attachment: Option<&AttachmentText>) -> String {
    let feedback = feedback.trim();
    match attachment {
        Some(attachment) => {
            let base = if feedback.is_empty() {
                "无特别意见"
            } else {
                feedback
            };
            format!(
                "{base}\n\n【附件内容参考】（文件名: {}）\n{}",
                attachment.name, attachment.content
            )
        }
        None => {
            if feedback.is_empty() {
                "无特别意见，请根据复检清单进行检查和完善".to_string()
            } else {
                feedback.to_string()
            }
        }
    }
}
