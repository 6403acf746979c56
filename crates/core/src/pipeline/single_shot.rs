//! Single-shot feature controller.
//!
//! The status-report writer, weekly-summary writer and feature-keyword
//! expander are degenerate one-stage pipelines (`Idle → Done`): validate
//! required fields, issue one streaming call under the feature's fixed
//! instruction, then enable follow-up conversation against the output.
//! One parameterized controller drives all three.

use crate::engine::StreamingEngine;
use crate::history::HistoryStore;
use crate::pipeline::error::PipelineError;
use crate::pipeline::stage::{cancel_stage, complete_stage, fail_stage, start_stage};
use crate::pipeline::{request_for, RunOutcome};
use crate::prompts::PromptSet;
use crate::session::SessionContext;
use prd_protocol::{DownloadBlob, FeatureKind, PipelineStage, UiEvent};
use std::collections::BTreeMap;
use tokio::sync::mpsc::Sender;

/// Validated input of one single-shot feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleShotInput {
    /// 汇报助手: problem / solution / expected result.
    Report {
        problem: String,
        solution: String,
        expected: String,
    },

    /// 周报助手: this week's daily logs.
    Weekly { daily_logs: String },

    /// 白皮书助手: a feature keyword to expand.
    Whitepaper { keyword: String },
}

impl SingleShotInput {
    pub fn kind(&self) -> FeatureKind {
        match self {
            SingleShotInput::Report { .. } => FeatureKind::ReportAssistant,
            SingleShotInput::Weekly { .. } => FeatureKind::WeeklyReport,
            SingleShotInput::Whitepaper { .. } => FeatureKind::WhitepaperAssistant,
        }
    }

    /// Check every required field non-empty, before any backend call.
    fn validate(&self) -> Result<(), PipelineError> {
        let check = |value: &str, label: &str| {
            if value.trim().is_empty() {
                Err(PipelineError::EmptyInput(label.to_string()))
            } else {
                Ok(())
            }
        };

        match self {
            SingleShotInput::Report {
                problem,
                solution,
                expected,
            } => {
                check(problem, "当前问题")?;
                check(solution, "解决方案")?;
                check(expected, "预期结果")
            }
            SingleShotInput::Weekly { daily_logs } => check(daily_logs, "本周日报"),
            SingleShotInput::Whitepaper { keyword } => check(keyword, "功能关键词"),
        }
    }

    fn compose_prompt(&self) -> String {
        match self {
            SingleShotInput::Report {
                problem,
                solution,
                expected,
            } => format!(
                "请根据以下信息，撰写一份给领导的工作汇报文案：\n\n\
                 【当前问题】\n{problem}\n\n\
                 【解决方案】\n{solution}\n\n\
                 【预期结果】\n{expected}\n\n\
                 请按照模板格式输出汇报文案。"
            ),
            SingleShotInput::Weekly { daily_logs } => {
                format!("Input Data (本周日报/工作记录):\n{daily_logs}")
            }
            SingleShotInput::Whitepaper { keyword } => {
                format!("请输入功能关键词：\n【{keyword}】")
            }
        }
    }

    fn system_instruction<'a>(&self, prompts: &'a PromptSet) -> &'a str {
        match self {
            SingleShotInput::Report { .. } => &prompts.report,
            SingleShotInput::Weekly { .. } => &prompts.weekly,
            SingleShotInput::Whitepaper { .. } => &prompts.whitepaper,
        }
    }

    fn summary(&self) -> BTreeMap<String, String> {
        let mut inputs = BTreeMap::new();
        match self {
            SingleShotInput::Report {
                problem,
                solution,
                expected,
            } => {
                inputs.insert("当前问题".to_string(), problem.clone());
                inputs.insert("解决方案".to_string(), solution.clone());
                inputs.insert("预期结果".to_string(), expected.clone());
            }
            SingleShotInput::Weekly { daily_logs } => {
                inputs.insert("本周日报".to_string(), daily_logs.clone());
            }
            SingleShotInput::Whitepaper { keyword } => {
                inputs.insert("功能关键词".to_string(), keyword.clone());
            }
        }
        inputs
    }
}

/// Single-shot pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleShotState {
    Idle,
    Done,
}

/// Controller shared by all single-shot features.
pub struct SingleShotController {
    kind: FeatureKind,
    state: SingleShotState,
    output: String,
    input_summary: BTreeMap<String, String>,
    stages: Vec<PipelineStage>,
    recorded: bool,
}

impl SingleShotController {
    pub fn new(kind: FeatureKind) -> Self {
        Self {
            kind,
            state: SingleShotState::Idle,
            output: String::new(),
            input_summary: BTreeMap::new(),
            stages: Vec::new(),
            recorded: false,
        }
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn state(&self) -> SingleShotState {
        self.state
    }

    /// The produced text (possibly partial after cancellation).
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Run the single stage for one submission.
    pub async fn submit(
        &mut self,
        engine: &StreamingEngine,
        session: &mut SessionContext,
        input: SingleShotInput,
        ui_tx: &Sender<UiEvent>,
    ) -> Result<RunOutcome, PipelineError> {
        debug_assert_eq!(input.kind(), self.kind);
        input.validate()?;

        self.output.clear();
        self.stages.clear();
        self.recorded = false;
        self.state = SingleShotState::Idle;
        self.input_summary = input.summary();
        session.cancel.clear();

        let prompt = input.compose_prompt();
        let mut stage = PipelineStage::new("writing", prompt.clone());
        start_stage(&mut stage, ui_tx).await;

        let request = request_for(session, prompt, input.system_instruction(&session.prompts));
        let outcome = engine
            .call_and_render(request, session.cancel.clone(), ui_tx)
            .await;

        if outcome.cancelled {
            self.output = outcome.answer.clone();
            cancel_stage(&mut stage, Some(outcome.answer), ui_tx).await;
            self.stages.push(stage);
            return Ok(RunOutcome::Cancelled);
        }

        if let Some(error) = outcome.error {
            fail_stage(&mut stage, ui_tx).await;
            self.stages.push(stage);
            return Ok(RunOutcome::Failed(error));
        }

        if !outcome.succeeded {
            fail_stage(&mut stage, ui_tx).await;
            self.stages.push(stage);
            return Ok(RunOutcome::Failed("生成结果为空".to_string()));
        }

        self.output = outcome.answer.clone();
        complete_stage(&mut stage, outcome.answer, ui_tx).await;
        self.stages.push(stage);
        self.state = SingleShotState::Done;

        Ok(RunOutcome::Completed)
    }

    /// Append exactly one history record for the finished run.
    pub fn record_history(
        &mut self,
        history: &mut HistoryStore,
        download: Option<DownloadBlob>,
    ) -> Option<u64> {
        if self.state != SingleShotState::Done || self.recorded {
            return None;
        }
        self.recorded = true;

        Some(history.record(
            self.kind,
            self.input_summary.clone(),
            self.output.clone(),
            download,
        ))
    }
}
