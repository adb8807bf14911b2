//! Insight generation: request parsing, the pipeline and its HTTP handler.

pub mod api;
pub mod pipeline;
pub mod request;

pub use pipeline::{InsightError, InsightPipeline};
pub use request::InsightRequest;
