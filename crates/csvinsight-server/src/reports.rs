use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use csvinsight_common::Report;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::{error_response, json_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;

/// Most recent reports, newest first.
#[utoipa::path(
    get,
    path = "/reports",
    tag = "Reports",
    responses(
        (status = 200, description = "Most recent reports", body = Vec<Report>),
        (status = 500, description = "Report store unavailable or not configured", body = ApiError)
    )
)]
async fn list_reports(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.list(state.config.reports.list_limit).await {
        Ok(reports) => json_response(StatusCode::OK, reports),
        Err(e) => {
            tracing::error!(trace_id = %trace_id, error = %e, "Failed to list reports");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

pub fn report_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_reports))
}
