//! Per-feature conversation store and follow-up calls.
//!
//! Every feature exposes a follow-up dialogue against its finished output.
//! Turn logs are append-only, keyed by feature, and never shared across
//! features; context windows are bounded to the most recent turns.

use crate::engine::StreamingEngine;
use crate::pipeline::PipelineError;
use crate::prompts::PromptSet;
use crate::session::SessionContext;
use prd_protocol::{ConversationTurn, FeatureKind, GenerationRequest, Role, UiEvent};
use std::collections::HashMap;
use tokio::sync::mpsc::Sender;

/// Maximum turns included in a follow-up context window.
pub const MAX_CONTEXT_TURNS: usize = 10;

/// Append-only turn logs, one per feature.
#[derive(Debug, Default)]
pub struct ConversationStore {
    logs: HashMap<FeatureKind, Vec<ConversationTurn>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn to a feature's log.
    pub fn append(&mut self, kind: FeatureKind, turn: ConversationTurn) {
        self.logs.entry(kind).or_default().push(turn);
    }

    /// All turns of one feature, in arrival order.
    pub fn turns(&self, kind: FeatureKind) -> &[ConversationTurn] {
        self.logs.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Discard all turns for one feature at once.
    pub fn clear(&mut self, kind: FeatureKind) {
        self.logs.remove(&kind);
    }

    /// Format the bounded context window as alternating 用户/助手 blocks.
    ///
    /// Returns an empty string when the feature has no turns yet.
    pub fn build_context(&self, kind: FeatureKind) -> String {
        let turns = self.turns(kind);
        if turns.is_empty() {
            return String::new();
        }

        let recent = if turns.len() > MAX_CONTEXT_TURNS {
            &turns[turns.len() - MAX_CONTEXT_TURNS..]
        } else {
            turns
        };

        let mut context = String::from("\n\n【对话历史】\n");
        for turn in recent {
            let role_label = match turn.role {
                Role::User => "用户",
                Role::Assistant => "助手",
            };
            context.push_str(&format!("{role_label}: {}\n\n", turn.content));
        }
        context
    }
}

/// The label naming a feature's finished output in follow-up prompts.
pub fn context_label(kind: FeatureKind) -> &'static str {
    match kind {
        FeatureKind::GeneratePrd => "已生成的策划案",
        FeatureKind::OptimizePrd => "已优化的策划案",
        FeatureKind::ReportAssistant => "已生成的汇报文案",
        FeatureKind::WeeklyReport => "已生成的周报",
        FeatureKind::WhitepaperAssistant => "已生成的功能描述",
    }
}

/// The system instruction a feature's follow-up calls run under.
pub fn follow_up_instruction(kind: FeatureKind, prompts: &PromptSet) -> &str {
    match kind {
        FeatureKind::GeneratePrd => &prompts.generate,
        FeatureKind::OptimizePrd => &prompts.initial_fix,
        FeatureKind::ReportAssistant => &prompts.report,
        FeatureKind::WeeklyReport => &prompts.weekly,
        FeatureKind::WhitepaperAssistant => &prompts.whitepaper,
    }
}

/// The reply produced by one follow-up exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpReply {
    /// The assistant's reply text; partial when interrupted, None when the
    /// call failed before producing anything.
    pub reply: Option<String>,

    /// Whether the reply was cut short by cancellation.
    pub interrupted: bool,

    /// Terminal error message, if the call failed.
    pub error: Option<String>,
}

/// Run one follow-up exchange against a feature's finished output.
///
/// The user's message is appended to the turn log before the call; the
/// reply is appended after it — including a partial reply on cancellation,
/// labeled as interrupted. A failed call with no partial text appends no
/// assistant turn.
pub async fn follow_up(
    engine: &StreamingEngine,
    session: &mut SessionContext,
    kind: FeatureKind,
    finished_output: &str,
    user_message: &str,
    ui_tx: &Sender<UiEvent>,
) -> Result<FollowUpReply, PipelineError> {
    if user_message.trim().is_empty() {
        return Err(PipelineError::EmptyInput("对话内容".to_string()));
    }

    session
        .conversations
        .append(kind, ConversationTurn::new(Role::User, user_message));

    let function_context = format!("【{}】\n{finished_output}", context_label(kind));
    let history_context = session.conversations.build_context(kind);
    let full_prompt = format!(
        "{function_context}\n\n{history_context}\n\n【当前用户输入】\n{user_message}\n\n\
         请基于以上上下文和对话历史，回答用户的问题或按要求进行修改。"
    );

    let request = build_request(session, kind, full_prompt);
    let outcome = engine
        .call_and_render(request, session.cancel.clone(), ui_tx)
        .await;

    if let Some(error) = outcome.error {
        if !outcome.answer.is_empty() {
            session
                .conversations
                .append(kind, ConversationTurn::new(Role::Assistant, &outcome.answer));
        }
        return Ok(FollowUpReply {
            reply: if outcome.answer.is_empty() {
                None
            } else {
                Some(outcome.answer)
            },
            interrupted: false,
            error: Some(error),
        });
    }

    if outcome.cancelled {
        // A cancelled reply is still recorded if any partial text exists.
        if !outcome.answer.is_empty() {
            session
                .conversations
                .append(kind, ConversationTurn::interrupted(&outcome.answer));
        }
        return Ok(FollowUpReply {
            reply: if outcome.answer.is_empty() {
                None
            } else {
                Some(outcome.answer)
            },
            interrupted: true,
            error: None,
        });
    }

    session
        .conversations
        .append(kind, ConversationTurn::new(Role::Assistant, &outcome.answer));

    Ok(FollowUpReply {
        reply: Some(outcome.answer),
        interrupted: false,
        error: None,
    })
}

fn build_request(session: &SessionContext, kind: FeatureKind, prompt: String) -> GenerationRequest {
    let mut request = GenerationRequest::new(prompt, session.model_id.clone())
        .with_system_instruction(follow_up_instruction(kind, &session.prompts));
    if let Some(budget) = session.reasoning_budget {
        request = request.with_reasoning_budget(budget);
    }
    request
}
