//! Configuration models and built-in model lists.

use crate::prompts::PromptSet;

/// Backend models offered when no explicit list is configured.
pub const AVAILABLE_MODELS: [&str; 11] = [
    "gemini-2.5-pro-preview-06-05",
    "gemini-2.5-flash-preview-05-20",
    "gemini-2.5-flash-preview-04-17",
    "gemini-2.5-pro-exp-03-25",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-2.0-flash-live-001",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
    "gemini-1.0-pro",
];

/// Models that accept file attachments (multimodal input).
pub const FILE_UPLOAD_SUPPORTED_MODELS: [&str; 10] = [
    "gemini-3-pro-preview",
    "gemini-2.5-pro-preview-06-05",
    "gemini-2.5-flash-preview-05-20",
    "gemini-2.5-flash-preview-04-17",
    "gemini-2.5-pro-exp-03-25",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
];

/// Attachment file types accepted by the extraction collaborator.
pub const SUPPORTED_FILE_TYPES: [&str; 4] = ["pdf", "docx", "txt", "md"];

/// Default thinking-token budget for reasoning-capable models.
pub const DEFAULT_REASONING_BUDGET: u32 = 10000;

/// Whether the model accepts file attachments (partial match in either
/// direction, tolerating versioned identifiers).
pub fn is_file_upload_supported(model_id: &str) -> bool {
    FILE_UPLOAD_SUPPORTED_MODELS
        .iter()
        .any(|supported| model_id.contains(supported) || supported.contains(model_id))
}

/// Unified application configuration loaded from the `.prd-kit/` directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Selected backend model.
    pub model: String,

    /// Thinking-token budget for reasoning-capable models.
    pub reasoning_budget: u32,

    /// Upper bound offered for optimize-pipeline reflection rounds.
    pub max_reflection_rounds: u32,

    /// Models offered for selection.
    pub models: Vec<String>,

    /// System instructions (built-ins plus project overrides).
    pub prompts: PromptSet,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: AVAILABLE_MODELS[0].to_string(),
            reasoning_budget: DEFAULT_REASONING_BUDGET,
            max_reflection_rounds: 10,
            models: AVAILABLE_MODELS.iter().map(ToString::to_string).collect(),
            prompts: PromptSet::default(),
        }
    }
}
