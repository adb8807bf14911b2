use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use csvinsight_ai::InsightGenerator;
use csvinsight_common::HealthStatus;
use csvinsight_storage::ReportStore;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::json_response;
use crate::state::AppState;

/// Probes the report store and the AI provider independently.
///
/// Both probes always run; one failing never hides the result of the other.
pub async fn check_health(generator: &dyn InsightGenerator, store: &dyn ReportStore) -> HealthStatus {
    let (db, ai) = tokio::join!(store.ping(), generator.health_check());

    let mut status = HealthStatus::default();

    match db {
        Ok(()) => status.database = true,
        Err(e) => {
            tracing::error!(error = %e, "Health check: database failed");
            status.database_error = Some(e.to_string());
        }
    }

    match ai {
        Ok(()) => status.ai = true,
        Err(e) => {
            tracing::error!(error = %e, "Health check: AI provider failed");
            status.ai_error = Some(e.to_string());
        }
    }

    status
}

/// Report backend, database and AI provider reachability.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Reachability of each dependency", body = HealthStatus)
    )
)]
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = check_health(state.generator.as_ref(), state.store.as_ref()).await;
    json_response(StatusCode::OK, status)
}

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health))
}
