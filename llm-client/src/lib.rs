//! Generative text client library
//!
//! Provides the `LlmProvider` capability used to expand a topic into a
//! podcast script, plus the concrete providers that implement it.

pub mod error;
pub mod provider;
pub mod providers;

pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, get_provider};
