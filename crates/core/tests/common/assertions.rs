//! Assertion helpers for pipeline integration tests.

use prd_protocol::{StageStatus, UiEvent};

use super::fixtures::SECTION_MARKERS;

/// Assert the document contains all ten mandatory section markers.
pub fn assert_all_sections_present(document: &str) {
    for marker in SECTION_MARKERS {
        assert!(
            document.contains(marker),
            "document missing section marker {marker}"
        );
    }
}

/// Assert a stage-finished event with the given name and status was sent.
pub fn assert_stage_finished(events: &[UiEvent], stage_name: &str, status: StageStatus) {
    assert!(
        events.iter().any(|event| matches!(
            event,
            UiEvent::StageFinished { name, status: s } if name == stage_name && *s == status
        )),
        "no StageFinished({stage_name}, {status:?}) among {events:?}"
    );
}

/// Count the reflection rounds announced through the UI channel.
pub fn count_rounds_started(events: &[UiEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, UiEvent::RoundStarted { .. }))
        .count()
}
