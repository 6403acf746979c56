//! # prd-protocol
//!
//! Core protocol definitions and data models for prd-kit.
//!
//! This crate defines all shared data structures used for:
//! - Streaming generation calls (events and requests)
//! - Pipeline stage state tracking
//! - Parsed document lines for spreadsheet export
//! - Conversation turns and session history records
//! - Events sent from the core to the user-facing surface
//!
//! ## Modules
//!
//! - [`stream_models`]: Streaming call events and generation requests
//! - [`stage_models`]: Pipeline stage definitions and status
//! - [`document_models`]: Heading-level document lines
//! - [`chat_models`]: Per-feature conversation turns
//! - [`history_models`]: Feature identifiers and session history records
//! - [`ui`]: Events for the rendering surface
//!
//! ## Design Principles
//!
//! - Minimal dependencies: only serde and chrono
//! - Independent compilation: no dependencies on other prd-kit crates

pub mod chat_models;
pub mod document_models;
pub mod history_models;
pub mod stage_models;
pub mod stream_models;
pub mod ui;

// Re-export all public types for convenience
pub use chat_models::*;
pub use document_models::*;
pub use history_models::*;
pub use stage_models::*;
pub use stream_models::*;
pub use ui::*;
