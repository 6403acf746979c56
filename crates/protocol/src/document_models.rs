//! Parsed document line models.
//!
//! Output of the heading-level document parser, consumed by the
//! spreadsheet export collaborator.

use serde::{Deserialize, Serialize};

/// One non-blank line of an outline-style document with its structural depth.
///
/// Level 1 is a top-level numbered heading (`1、...`), level 2 a `1.1`-style
/// heading, and so on down to level 4. Body text lands one column below the
/// most recently seen heading, floored at 2.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DocumentLine {
    /// The original line content, untrimmed of its numeric prefix.
    pub text: String,

    /// Structural depth, >= 1.
    pub level: u8,
}

impl DocumentLine {
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}
