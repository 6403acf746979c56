//! Configuration loading and management.
//!
//! This module provides functionality to load and parse all configuration
//! from the `.prd-kit/` directory structure.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::{
    is_file_upload_supported, AppConfig, AVAILABLE_MODELS, DEFAULT_REASONING_BUDGET,
    FILE_UPLOAD_SUPPORTED_MODELS, SUPPORTED_FILE_TYPES,
};
