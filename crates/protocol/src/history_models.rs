//! Feature identifiers and session history records.
//!
//! Each completed run of a feature is snapshotted into an immutable
//! `HistoryRecord` for audit and replay within the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of features offered by the assistant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKind {
    /// 生成策划案 — generate a full design document from a feature idea.
    GeneratePrd,

    /// 优化策划案 — refine an existing document via a reflection loop.
    OptimizePrd,

    /// 汇报助手 — turn scattered notes into a structured status report.
    ReportAssistant,

    /// 周报助手 — condense daily logs into a weekly summary.
    WeeklyReport,

    /// 白皮书助手 — expand a feature keyword into a standard statement.
    WhitepaperAssistant,
}

impl FeatureKind {
    /// The user-facing display name, also used as a history record's
    /// function type.
    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::GeneratePrd => "生成策划案",
            FeatureKind::OptimizePrd => "优化策划案",
            FeatureKind::ReportAssistant => "汇报助手",
            FeatureKind::WeeklyReport => "周报助手",
            FeatureKind::WhitepaperAssistant => "白皮书助手",
        }
    }

    /// All features, in menu order.
    pub fn all() -> [FeatureKind; 5] {
        [
            FeatureKind::GeneratePrd,
            FeatureKind::OptimizePrd,
            FeatureKind::ReportAssistant,
            FeatureKind::WeeklyReport,
            FeatureKind::WhitepaperAssistant,
        ]
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A downloadable artifact attached to a history record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DownloadBlob {
    /// Raw file bytes.
    pub data: Vec<u8>,

    /// Suggested file name for the download.
    pub filename: String,

    /// Media type, e.g. the xlsx MIME type.
    pub mime: String,
}

/// One completed run of any feature.
///
/// Created once, at the moment a feature's terminal stage completes
/// successfully; immutable thereafter. Text is snapshot-copied at
/// creation time and does not alias live pipeline state.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HistoryRecord {
    /// Monotonically increasing identifier, unique within a session.
    pub id: u64,

    /// Creation time.
    pub created_at: DateTime<Utc>,

    /// Which feature produced this record.
    pub function_type: FeatureKind,

    /// Feature-specific input fields, by display name.
    pub input_summary: BTreeMap<String, String>,

    /// The final produced document or text.
    pub output_text: String,

    /// Optional downloadable artifact.
    #[serde(default)]
    pub download: Option<DownloadBlob>,
}
