//! Client side of the chat-completion service used to turn tabular data into
//! a Markdown analysis.
//!
//! [`InsightGenerator`] is the seam the server depends on; [`OpenRouterProvider`]
//! is the production implementation.

pub mod error;
pub mod generator;
pub mod models;
pub mod prompt;
pub mod providers;

pub use error::AiError;
pub use generator::InsightGenerator;
pub use providers::openrouter::{OpenRouterConfig, OpenRouterProvider};
