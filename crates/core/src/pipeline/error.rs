//! Error types for pipeline submission.

use thiserror::Error;

/// Errors raised before any backend call is made.
///
/// Backend failures never surface as `PipelineError`: they are handled at
/// the stage that triggered them and reported through the run outcome, so
/// nothing propagates as an unhandled fault past a stage boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A required input field was empty; no backend round-trip is made.
    #[error("请填写【{0}】！")]
    EmptyInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_message() {
        let error = PipelineError::EmptyInput("功能描述".to_string());
        assert_eq!(error.to_string(), "请填写【功能描述】！");
    }
}
