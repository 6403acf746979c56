//! Test fixtures for pipeline integration tests.

use prd_core::backend::Backend;
use prd_core::engine::StreamingEngine;
use prd_core::session::SessionContext;
use prd_protocol::UiEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The ten mandatory section headings of a generated document.
pub const SECTION_MARKERS: [&str; 10] = [
    "1、功能概述",
    "2、战略定位",
    "3、用户场景",
    "4、功能规格",
    "5、AI处理逻辑",
    "6、容错设计",
    "7、验收标准",
    "8、能力边界",
    "9、技术依赖",
    "10、版本规划",
];

/// A fixed ten-section document as the stubbed generation output.
pub fn ten_section_document() -> String {
    let mut document = String::new();
    for (index, marker) in SECTION_MARKERS.iter().enumerate() {
        document.push_str(marker);
        document.push('\n');
        document.push_str(&format!("第{}章的正文内容。\n\n", index + 1));
    }
    document
}

/// A session with a fixed reasoning-capable model and default prompts.
pub fn test_session() -> SessionContext {
    SessionContext::new("gemini-2.5-pro-preview-06-05")
}

/// Engine over the given backend.
pub fn test_engine(backend: Arc<dyn Backend>) -> StreamingEngine {
    StreamingEngine::new(backend)
}

/// A UI channel wide enough that tests never block on sends.
pub fn ui_channel() -> (mpsc::Sender<UiEvent>, mpsc::Receiver<UiEvent>) {
    mpsc::channel(1024)
}

/// Drain all buffered UI events.
pub fn drain_ui(rx: &mut mpsc::Receiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
