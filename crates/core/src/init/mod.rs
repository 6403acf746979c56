//! Initialization module for creating `.prd-kit` directory structures.
//!
//! This module provides functionality to initialize a new prd-kit project
//! by generating a `.prd-kit/` directory with pre-configured templates
//! for:
//! - Project configuration (`config.toml`)
//! - System-prompt overrides (`prompts/`)
//!
//! # Example
//!
//! ```no_run
//! use prd_core::init::{generate_prd_kit_structure, InitOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! generate_prd_kit_structure(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

// Re-export commonly used types for convenience
pub use error::{InitError, InitResult};
pub use generator::{generate_prd_kit_structure, InitOptions};
pub use templates::{get_template, list_templates};
