//! Multi-stage pipeline controllers.
//!
//! Both document pipelines and the single-shot features are explicit
//! finite state machines driven by single-stage calls to the streaming
//! engine and renderer. A stage N+1 never starts before stage N has
//! reached a terminal status; this is enforced by each controller's state
//! field, not by any lock — controllers are owned by one logical flow.

pub mod error;
pub mod generate;
pub mod optimize;
pub mod single_shot;
pub mod stage;

use crate::engine::StreamingEngine;
use crate::session::SessionContext;
use prd_protocol::{GenerationRequest, PipelineStage, UiEvent};
use tokio::sync::mpsc::Sender;

pub use error::PipelineError;
pub use generate::{GenerateController, GenerateState};
pub use optimize::{OptimizeController, OptimizeState};
pub use single_shot::{SingleShotController, SingleShotInput, SingleShotState};

/// Extracted text of an uploaded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentText {
    /// Original file name, shown in the composed prompt.
    pub name: String,

    /// Extracted text content (possibly a sentinel failure string).
    pub content: String,
}

/// How one pipeline run ended.
///
/// Backend failures and cancellations are normal terminal outcomes, not
/// errors: the stage that hit them reverts to a defined state and partial
/// output is preserved. Only pre-call validation is reported as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The pipeline reached `Done`.
    Completed,

    /// The user cancelled; whatever text was produced is retained.
    Cancelled,

    /// A terminal backend error; the message was already surfaced.
    Failed(String),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Build a generation request under the session's model and budget.
pub(crate) fn request_for(
    session: &SessionContext,
    prompt: String,
    system_instruction: &str,
) -> GenerationRequest {
    let mut request = GenerationRequest::new(prompt, session.model_id.clone())
        .with_system_instruction(system_instruction);
    if let Some(budget) = session.reasoning_budget {
        request = request.with_reasoning_budget(budget);
    }
    request
}

/// Run a checklist self-check over a finished document.
///
/// Shared by the generate pipeline's checking stage and the optimize
/// pipeline's final check; failure and cancellation are non-fatal and
/// yield an empty report. Returns the terminal stage and the report text.
pub(crate) async fn run_self_check(
    engine: &StreamingEngine,
    session: &SessionContext,
    document: &str,
    stage_name: &str,
    ui_tx: &Sender<UiEvent>,
) -> (PipelineStage, String) {
    let prompt = format!(
        "请对以下策划案进行复检清单检查：\n\n{document}\n\n请逐一检查每一项，给出详细的检查结果。"
    );

    let mut stage = PipelineStage::new(stage_name, document.to_string());
    stage::start_stage(&mut stage, ui_tx).await;

    let request = request_for(session, prompt, &session.prompts.self_check);
    let outcome = engine
        .call_and_render(request, session.cancel.clone(), ui_tx)
        .await;

    let report = if outcome.succeeded {
        stage::complete_stage(&mut stage, outcome.answer.clone(), ui_tx).await;
        outcome.answer
    } else if outcome.cancelled {
        stage::cancel_stage(&mut stage, None, ui_tx).await;
        String::new()
    } else {
        stage::fail_stage(&mut stage, ui_tx).await;
        String::new()
    };

    (stage, report)
}
