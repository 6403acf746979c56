//! Attachment text extraction.
//!
//! Extraction never fails: a bad attachment degrades to a bracketed
//! sentinel string embedded in the extracted text, so it cannot block the
//! primary generation flow.

use encoding_rs::{Encoding, GB18030, GBK, UTF_8, WINDOWS_1252};

/// Sentinel returned when no encoding in the fallback chain decodes the
/// bytes cleanly.
pub const DECODE_FAILURE: &str = "[文本文件解码失败]";

/// Sentinel returned for unknown file extensions.
pub const UNSUPPORTED_TYPE: &str = "[不支持的文件类型]";

/// Ordered fallback chain for plain-text decoding.
const ENCODINGS: [&Encoding; 4] = [UTF_8, GBK, GB18030, WINDOWS_1252];

/// File-content extraction collaborator.
///
/// Implementations turn uploaded bytes into a prompt-ready string and
/// must not fail; failures are reported inline as sentinel strings.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, file_bytes: &[u8], file_name: &str) -> String;
}

/// Default extractor: handles plain text and Markdown via the encoding
/// fallback chain. PDF and Word are external-collaborator territory and
/// yield sentinel messages unless a richer extractor is plugged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, file_bytes: &[u8], file_name: &str) -> String {
        let name = file_name.to_lowercase();

        if name.ends_with(".pdf") {
            "[PDF解析失败: 未配置PDF解析器]".to_string()
        } else if name.ends_with(".docx") {
            "[Word文档解析失败: 未配置Word解析器]".to_string()
        } else if name.ends_with(".txt") || name.ends_with(".md") {
            decode_text(file_bytes)
        } else {
            UNSUPPORTED_TYPE.to_string()
        }
    }
}

/// Decode bytes by trying each encoding in order until one succeeds.
pub fn decode_text(bytes: &[u8]) -> String {
    for encoding in ENCODINGS {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return text.trim().to_string();
        }
    }
    DECODE_FAILURE.to_string()
}
