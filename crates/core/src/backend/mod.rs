//! Backend abstraction and adapters.
//!
//! This module provides the `Backend` trait (Adapter Pattern) over the
//! hosted LLM service and its concrete implementations.

pub mod adapters;
pub mod base;

pub use adapters::{GeminiCliBackend, MockBackend};
pub use base::{Backend, BackendError, Fragment, FragmentStream};
