//! Chat-completion provider abstraction
//!
//! The dashboard only needs single-turn, text-in/text-out completions, so the
//! surface here is small:
//!
//! - [`Message`] and [`Role`] for the conversation
//! - [`CompletionRequest`] / [`CompletionResponse`] with a builder
//! - [`LLMProvider`], the seam the summary generator is written against
//! - [`providers::OpenAIProvider`] for OpenAI-compatible endpoints (feature `openai`)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

#[cfg(feature = "openai")]
pub mod providers;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
