//! Events sent from the core to the user-facing surface.
//!
//! Communication is asynchronous and channel-based: the core pushes
//! `UiEvent`s through a `tokio::sync::mpsc` channel while a surface task
//! (CLI printer, or any container that can be incrementally updated)
//! consumes them. The core never renders anything itself.

use serde::{Deserialize, Serialize};

use crate::stage_models::StageStatus;

/// Status updates sent from the core to the rendering surface.
///
/// Uses tagged enum serialization:
/// ```json
/// { "type": "answer", "payload": { "text": "正在生成的内容 ▌" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum UiEvent {
    /// The visible answer accumulated so far, with a trailing cursor
    /// marker signalling that generation is still in progress.
    Answer { text: String },

    /// The final answer text, cursor marker stripped.
    AnswerComplete { text: String },

    /// The full reasoning text accumulated so far.
    ///
    /// Advisory side channel; surfaces typically collapse it by default.
    Reasoning { text: String },

    /// A non-fatal notice (retry in progress, generation cancelled).
    Notice { text: String },

    /// A terminal failure notice for the current call.
    Failure { text: String },

    /// A pipeline stage has started running.
    StageStarted { name: String },

    /// A pipeline stage has reached a terminal status.
    StageFinished { name: String, status: StageStatus },

    /// A reflection round is beginning (1-based).
    RoundStarted { index: u32 },
}
