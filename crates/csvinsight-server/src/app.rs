use crate::state::AppState;
use crate::{health, insights, logging, reports};
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "csvinsight API",
        description = "AI-generated insights for uploaded CSV data",
    ),
    tags(
        (name = "Health", description = "Dependency reachability"),
        (name = "Insights", description = "Insight generation"),
        (name = "Reports", description = "Previously generated reports")
    )
)]
struct ApiDoc;

pub fn build_http_app(state: AppState) -> Router {
    let (health_router, health_spec) = health::health_routes().split_for_parts();
    let (insight_router, insight_spec) = insights::api::insight_routes().split_for_parts();
    let (report_router, report_spec) = reports::report_routes().split_for_parts();

    let mut spec = ApiDoc::openapi();
    spec.merge(health_spec);
    spec.merge(insight_spec);
    spec.merge(report_spec);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    health_router
        .merge(insight_router)
        .merge(report_router)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", spec))
        .layer(DefaultBodyLimit::max(logging::MAX_BUFFERED_BODY))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
