use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Filename recorded when the caller does not supply one.
pub const DEFAULT_FILENAME: &str = "unknown.csv";

/// A persisted analysis of one uploaded file.
///
/// Reports are append-only: the store assigns `id` and `timestamp` on
/// creation and never changes them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub id: i32,
    pub filename: String,
    /// Markdown produced by the AI provider.
    pub insights: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of one insight generation.
///
/// `report_id` and `warning` are mutually exclusive: a saved report yields an
/// id, a failed save yields a warning and the insights are still returned.
///
/// # Examples
///
/// ```
/// use csvinsight_common::InsightOutcome;
///
/// let outcome = InsightOutcome::unsaved("## Summary".into(), "disk full");
/// assert_eq!(outcome.report_id, None);
/// assert_eq!(outcome.warning.as_deref(), Some("Report was not saved: disk full"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightOutcome {
    /// Markdown analysis
    pub insights: String,
    /// Id of the stored report, `null` when it could not be saved
    pub report_id: Option<i32>,
    /// Present only when saving the report failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl InsightOutcome {
    pub fn saved(insights: String, report_id: i32) -> Self {
        Self {
            insights,
            report_id: Some(report_id),
            warning: None,
        }
    }

    pub fn unsaved(insights: String, reason: impl std::fmt::Display) -> Self {
        Self {
            insights,
            report_id: None,
            warning: Some(format!("Report was not saved: {reason}")),
        }
    }
}

/// Diagnostic snapshot returned by `GET /health`.
///
/// Each probe is evaluated independently; a failed database probe never
/// prevents the AI probe from running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Always `true` when the server answers
    pub backend: bool,
    pub database: bool,
    pub ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            backend: true,
            database: false,
            ai: false,
            database_error: None,
            ai_error: None,
        }
    }
}
