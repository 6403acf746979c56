//! Session history store.
//!
//! Append-only log of completed feature runs. Records snapshot their text
//! at creation time and never alias live pipeline state; the whole list
//! can be cleared at once. A pure in-memory store satisfies the session
//! model — history is lost on process restart by design.

use chrono::Utc;
use prd_protocol::{DownloadBlob, FeatureKind, HistoryRecord};
use std::collections::BTreeMap;

/// Append-only list of completed runs with a monotonic id counter.
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: Vec<HistoryRecord>,
    next_id: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for one completed run. Returns the new record's id.
    pub fn record(
        &mut self,
        function_type: FeatureKind,
        input_summary: BTreeMap<String, String>,
        output_text: impl Into<String>,
        download: Option<DownloadBlob>,
    ) -> u64 {
        self.next_id += 1;
        let record = HistoryRecord {
            id: self.next_id,
            created_at: Utc::now(),
            function_type,
            input_summary,
            output_text: output_text.into(),
            download,
        };
        tracing::info!(id = record.id, feature = %function_type, "history record appended");
        self.records.push(record);
        self.next_id
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Look up one record by id.
    pub fn get(&self, id: u64) -> Option<&HistoryRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Discard every record. Ids keep increasing across clears.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// One-line summary of a record for list displays.
pub fn record_summary(record: &HistoryRecord) -> String {
    fn brief(text: &str, max_chars: usize) -> String {
        let short: String = text.chars().take(max_chars).collect();
        if text.chars().count() > max_chars {
            format!("{short}...")
        } else {
            short
        }
    }

    match record.function_type {
        FeatureKind::GeneratePrd => {
            let desc = record
                .input_summary
                .get("功能描述")
                .map(String::as_str)
                .unwrap_or("");
            format!("📝 {}", brief(desc, 30))
        }
        FeatureKind::OptimizePrd => "🔄 策划案优化".to_string(),
        FeatureKind::ReportAssistant => {
            let problem = record
                .input_summary
                .get("当前问题")
                .map(String::as_str)
                .unwrap_or("");
            format!("📊 {}", brief(problem, 20))
        }
        FeatureKind::WeeklyReport => "📅 周报生成".to_string(),
        FeatureKind::WhitepaperAssistant => {
            let keyword = record
                .input_summary
                .get("功能关键词")
                .map(String::as_str)
                .unwrap_or("");
            format!("📖 {keyword}")
        }
    }
}
