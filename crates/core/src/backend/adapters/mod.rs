//! Backend adapter implementations.

mod gemini_cli;
pub mod mock;

pub use gemini_cli::GeminiCliBackend;
pub use mock::MockBackend;
