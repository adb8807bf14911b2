use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use csvinsight_common::InsightOutcome;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::request::InsightRequest;
use crate::api::{error_response, json_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;

/// Generate a Markdown analysis of CSV data and store it as a report.
///
/// A storage failure does not fail the request: the insights are returned
/// with `reportId: null` and a `warning`.
#[utoipa::path(
    post,
    path = "/insights",
    tag = "Insights",
    request_body = InsightRequest,
    responses(
        (status = 200, description = "Insights generated", body = InsightOutcome),
        (status = 400, description = "Missing or invalid csvData", body = ApiError),
        (status = 500, description = "AI provider failed", body = ApiError)
    )
)]
async fn create_insights(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    let result = match InsightRequest::from_slice(&body) {
        Ok(req) => {
            state
                .pipeline
                .generate(&req.csv_data, req.filename.as_deref())
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => json_response(StatusCode::OK, outcome),
        Err(e) => {
            tracing::warn!(trace_id = %trace_id, error = %e, "Insight request failed");
            error_response(e.status_code(), &e.to_string())
        }
    }
}

pub fn insight_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(create_insights))
}
