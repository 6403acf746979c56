//! Heading-level document parser.
//!
//! Converts a loosely-numbered outline-style document into a sequence of
//! (content, level) pairs for tabular projection. Single forward pass with
//! one piece of mutable state: the level of the most recently seen
//! heading, which persists across blank lines and resets only at document
//! start.
//!
//! Patterns are tried from most-specific to least-specific. The greedy
//! longest-prefix order is load-bearing: `1.1.1、foo` must never be
//! mis-parsed as a level-1 line matching only the leading `1`. A body-text
//! line that itself starts with a bare integer and separator before any
//! real heading keeps its historical level-1 classification; callers
//! should not feed ambiguous numeric prose before the first heading.

use prd_protocol::DocumentLine;
use regex::Regex;
use std::sync::LazyLock;

// 一级标题: 1、 或 1. 开头（分隔符必需）
static LEVEL1: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)[、.．]\s*(.+)$").expect("valid level-1 pattern")
});
// 二级标题: 1.1、 或 1.1. 或 1.1 开头
static LEVEL2: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.\d+)[、.．]?\s*(.+)$").expect("valid level-2 pattern")
});
// 三级标题: 1.1.1 开头
static LEVEL3: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.\d+\.\d+)[、.．]?\s*(.+)$").expect("valid level-3 pattern")
});
// 四级标题: 1.1.1.1 开头
static LEVEL4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.\d+\.\d+\.\d+)[、.．]?\s*(.+)$").expect("valid level-4 pattern")
});

/// Parse a document into ordered lines with structural levels.
///
/// Blank lines are discarded entirely: they produce no line and do not
/// reset the heading state. Body text lands at
/// `max(current_heading_level + 1, 2)` once any heading has been seen,
/// else at level 1.
pub fn parse_document(text: &str) -> Vec<DocumentLine> {
    let mut lines = Vec::new();
    let mut current_level: u8 = 0;

    for raw in text.trim().split('\n') {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let level = if LEVEL4.is_match(line) {
            current_level = 4;
            4
        } else if LEVEL3.is_match(line) {
            current_level = 3;
            3
        } else if LEVEL2.is_match(line) {
            current_level = 2;
            2
        } else if LEVEL1.is_match(line) {
            current_level = 1;
            1
        } else if current_level > 0 {
            (current_level + 1).max(2)
        } else {
            1
        };

        lines.push(DocumentLine::new(line, level));
    }

    lines
}
