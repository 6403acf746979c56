//! Spreadsheet export of parsed documents.
//!
//! Projects the heading-leveled document into a five-column sheet (one
//! column per level, body text one column below its heading) plus an
//! optional second sheet holding the self-check report, split
//! line-by-line and color-tagged by its status markers.

use crate::parser::parse_document;
use prd_protocol::DocumentLine;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use thiserror::Error;

/// MIME type of the produced artifact.
pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Column headers of the document sheet.
const HEADERS: [&str; 5] = [
    "一级标题",
    "二级标题/内容",
    "三级标题/详情",
    "四级标题/说明",
    "详细内容",
];

const COLUMN_WIDTHS: [f64; 5] = [35.0, 40.0, 45.0, 50.0, 50.0];

/// Errors that can occur while building the workbook.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to build workbook: {0}")]
    Workbook(#[from] XlsxError),
}

/// Status tag of one check-report line, derived from its markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTag {
    /// ✅ 通过
    Pass,
    /// ⚠️ 部分满足
    Partial,
    /// ❌ 缺失
    Missing,
    /// No marker.
    Plain,
}

/// Classify one line of the check report by its status marker.
pub fn tag_check_line(line: &str) -> CheckTag {
    if line.contains('✅') {
        CheckTag::Pass
    } else if line.contains("⚠️") {
        CheckTag::Partial
    } else if line.contains('❌') {
        CheckTag::Missing
    } else {
        CheckTag::Plain
    }
}

/// Parse a document and serialize it as an xlsx workbook.
pub fn create_workbook(
    document: &str,
    check_result: Option<&str>,
) -> Result<Vec<u8>, ExportError> {
    let lines = parse_document(document);
    build_workbook(&lines, check_result)
}

/// Serialize already-parsed lines as an xlsx workbook.
pub fn build_workbook(
    lines: &[DocumentLine],
    check_result: Option<&str>,
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x4472C4))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    let level_formats = [
        // 一级标题
        Format::new()
            .set_bold()
            .set_font_size(12)
            .set_font_color(Color::RGB(0x1F4E79))
            .set_text_wrap()
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin),
        // 二级标题
        Format::new()
            .set_bold()
            .set_font_size(11)
            .set_font_color(Color::RGB(0x2E75B6))
            .set_text_wrap()
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin),
        // 三级标题
        Format::new()
            .set_font_size(10)
            .set_font_color(Color::RGB(0x5B9BD5))
            .set_text_wrap()
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin),
        // 正文
        Format::new()
            .set_font_size(10)
            .set_text_wrap()
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin),
    ];
    let empty_format = Format::new().set_border(FormatBorder::Thin);

    let sheet = workbook.add_worksheet();
    sheet.set_name("策划案")?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (index, line) in lines.iter().enumerate() {
        let row = index as u32 + 1;
        let col = (line.level.clamp(1, 5) - 1) as u16;
        let format = match line.level {
            1 => &level_formats[0],
            2 => &level_formats[1],
            3 => &level_formats[2],
            _ => &level_formats[3],
        };
        sheet.write_string_with_format(row, col, &line.text, format)?;

        // Border the rest of the row so the grid stays closed.
        for other in 0..HEADERS.len() as u16 {
            if other != col {
                sheet.write_string_with_format(row, other, "", &empty_format)?;
            }
        }
    }

    if let Some(check_result) = check_result.filter(|text| !text.trim().is_empty()) {
        write_check_sheet(&mut workbook, check_result, &header_format)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_check_sheet(
    workbook: &mut Workbook,
    check_result: &str,
    header_format: &Format,
) -> Result<(), ExportError> {
    let pass_format = Format::new().set_font_color(Color::RGB(0x228B22));
    let partial_format = Format::new().set_font_color(Color::RGB(0xFF8C00));
    let missing_format = Format::new().set_font_color(Color::RGB(0xDC143C));
    let plain_format = Format::new().set_text_wrap().set_align(FormatAlign::Top);

    let sheet = workbook.add_worksheet();
    sheet.set_name("AI复检结果")?;
    sheet.set_column_width(0, 100)?;
    sheet.write_string_with_format(0, 0, "AI复检清单检查结果", header_format)?;

    for (index, line) in check_result.trim().split('\n').enumerate() {
        let format = match tag_check_line(line) {
            CheckTag::Pass => &pass_format,
            CheckTag::Partial => &partial_format,
            CheckTag::Missing => &missing_format,
            CheckTag::Plain => &plain_format,
        };
        sheet.write_string_with_format(index as u32 + 1, 0, line, format)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_check_lines() {
        assert_eq!(tag_check_line("1. 功能核心 ✅ 通过"), CheckTag::Pass);
        assert_eq!(tag_check_line("2. 验收标准 ⚠️ 部分满足"), CheckTag::Partial);
        assert_eq!(tag_check_line("3. 技术依赖 ❌ 缺失"), CheckTag::Missing);
        assert_eq!(tag_check_line("总体评价：良好"), CheckTag::Plain);
    }

    #[test]
    fn test_workbook_bytes_produced() {
        let document = "1、功能概述\n一句话说明\n1.1、细节\n2、战略定位";
        let bytes = create_workbook(document, None).expect("workbook builds");
        // xlsx files are zip archives.
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_workbook_with_check_sheet() {
        let bytes = create_workbook("1、功能概述", Some("1. 功能核心 ✅ 通过"))
            .expect("workbook builds");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_empty_check_result_skips_sheet() {
        let with_empty = create_workbook("1、功能概述", Some("  ")).expect("builds");
        let without = create_workbook("1、功能概述", None).expect("builds");
        // Same sheet structure either way; exact bytes may differ by
        // timestamps, so only assert both are valid archives.
        assert_eq!(&with_empty[0..2], b"PK");
        assert_eq!(&without[0..2], b"PK");
    }
}
