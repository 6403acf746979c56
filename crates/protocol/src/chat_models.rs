//! Conversation turn models.
//!
//! One message of a per-feature follow-up dialogue. Turns are appended in
//! arrival order and never mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The author of a conversation turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a per-feature dialogue.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,

    pub content: String,

    /// Wall-clock time at creation.
    pub timestamp: DateTime<Utc>,

    /// True for an assistant reply that was cut short by cancellation.
    /// A partial reply is still recorded, labeled as interrupted.
    #[serde(default)]
    pub interrupted: bool,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            interrupted: false,
        }
    }

    /// Create an assistant turn for a reply interrupted by cancellation.
    pub fn interrupted(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            interrupted: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_turn_not_interrupted() {
        let turn = ConversationTurn::new(Role::User, "请补充验收标准");
        assert_eq!(turn.role, Role::User);
        assert!(!turn.interrupted);
    }

    #[test]
    fn test_interrupted_turn_is_assistant() {
        let turn = ConversationTurn::interrupted("部分回复");
        assert_eq!(turn.role, Role::Assistant);
        assert!(turn.interrupted);
    }
}
