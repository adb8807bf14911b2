use axum::http::StatusCode;
use csvinsight_ai::{AiError, InsightGenerator};
use csvinsight_common::{InsightOutcome, DEFAULT_FILENAME};
use csvinsight_storage::ReportStore;
use std::sync::Arc;

pub const CSV_REQUIRED: &str = "CSV data is required";

/// Failures that abort an insight generation.
///
/// Storage failures are deliberately absent: they surface as
/// [`InsightOutcome::warning`] instead.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    /// Caller sent no usable CSV data. Raised before any upstream call.
    #[error("{0}")]
    InvalidInput(String),

    /// The AI provider could not produce insights.
    #[error(transparent)]
    Generation(#[from] AiError),
}

impl InsightError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Turns CSV text into a Markdown report and stores it when possible.
///
/// The AI call must succeed; the store call is best-effort. A storage outage
/// never discards insights that were already generated.
#[derive(Clone)]
pub struct InsightPipeline {
    generator: Arc<dyn InsightGenerator>,
    store: Arc<dyn ReportStore>,
}

impl InsightPipeline {
    pub fn new(generator: Arc<dyn InsightGenerator>, store: Arc<dyn ReportStore>) -> Self {
        Self { generator, store }
    }

    pub async fn generate(
        &self,
        csv_data: &str,
        filename: Option<&str>,
    ) -> Result<InsightOutcome, InsightError> {
        if csv_data.is_empty() {
            return Err(InsightError::InvalidInput(CSV_REQUIRED.to_string()));
        }

        tracing::info!(
            provider = %self.generator.provider(),
            model = %self.generator.model_name(),
            csv_length = csv_data.len(),
            "Generating insights"
        );

        let insights = self.generator.generate(csv_data).await.map_err(|e| {
            tracing::error!(error = %e, "Insight generation failed");
            e
        })?;

        let filename = resolve_filename(filename);
        match self.store.create(filename, &insights).await {
            Ok(report) => {
                tracing::info!(report_id = report.id, filename = %filename, "Report saved");
                Ok(InsightOutcome::saved(insights, report.id))
            }
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "Report save failed");
                Ok(InsightOutcome::unsaved(insights, e))
            }
        }
    }
}

/// Absent and empty names both fall back to [`DEFAULT_FILENAME`].
pub fn resolve_filename(filename: Option<&str>) -> &str {
    match filename {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_FILENAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_defaults_when_absent_or_empty() {
        assert_eq!(resolve_filename(None), "unknown.csv");
        assert_eq!(resolve_filename(Some("")), "unknown.csv");
        assert_eq!(resolve_filename(Some("sales.csv")), "sales.csv");
    }

    #[test]
    fn errors_map_to_http_status() {
        assert_eq!(
            InsightError::InvalidInput(CSV_REQUIRED.into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        let ai = InsightError::from(AiError::MissingApiKey {
            env_var: "OPENROUTER_API_KEY",
        });
        assert_eq!(ai.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ai.to_string(), "OPENROUTER_API_KEY is not set");
    }
}
