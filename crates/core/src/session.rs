//! Explicit per-session context.
//!
//! All session-scoped mutable state lives here and is passed by reference
//! into each stage function — there are no ambient globals. The whole
//! object is owned exclusively by the single active flow; two pipeline
//! runs never execute concurrently against the same session, so no
//! locking discipline is required.

use crate::chat::ConversationStore;
use crate::config::AppConfig;
use crate::engine::CancelFlag;
use crate::history::HistoryStore;
use crate::prompts::PromptSet;

/// Session-scoped state shared across features.
pub struct SessionContext {
    /// Identifier of the currently selected backend model.
    pub model_id: String,

    /// Thinking-token budget offered to reasoning-capable models.
    pub reasoning_budget: Option<u32>,

    /// The shared cancellation cell, settable by the surface at any time.
    pub cancel: CancelFlag,

    /// Per-feature follow-up conversation logs.
    pub conversations: ConversationStore,

    /// Completed-run records.
    pub history: HistoryStore,

    /// System instructions in effect (built-ins plus overrides).
    pub prompts: PromptSet,
}

impl SessionContext {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            reasoning_budget: Some(crate::config::DEFAULT_REASONING_BUDGET),
            cancel: CancelFlag::new(),
            conversations: ConversationStore::new(),
            history: HistoryStore::new(),
            prompts: PromptSet::default(),
        }
    }

    /// Build a session from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model_id: config.model.clone(),
            reasoning_budget: Some(config.reasoning_budget),
            cancel: CancelFlag::new(),
            conversations: ConversationStore::new(),
            history: HistoryStore::new(),
            prompts: config.prompts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = SessionContext::new("gemini-2.5-pro");
        assert_eq!(session.model_id, "gemini-2.5-pro");
        assert!(session.reasoning_budget.is_some());
        assert!(!session.cancel.is_set());
        assert!(session.history.is_empty());
    }
}
