use async_trait::async_trait;

use crate::error::AiError;

/// Produces a Markdown analysis for a block of tabular text.
///
/// Implementations issue exactly one upstream request per call and never
/// retry. Payload size is the caller's concern.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Provider name, used in logs.
    fn provider(&self) -> &str;

    /// Model identifier sent upstream.
    fn model_name(&self) -> &str;

    /// Analyze `csv_data` and return the upstream content verbatim.
    async fn generate(&self, csv_data: &str) -> Result<String, AiError>;

    /// Lightweight reachability probe that does not run a generation.
    async fn health_check(&self) -> Result<(), AiError>;
}
