use std::sync::Arc;

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::post};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    AirPathError,
    models::{RouteComparison, RouteOption, RoutePreferences, RouteRequest},
    planner::RoutePlanner,
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompareRequest {
    pub routes: Vec<RouteOption>,
    #[serde(default)]
    pub preferences: RoutePreferences,
}

pub fn router(planner: Arc<RoutePlanner>) -> Router {
    Router::new()
        .route("/routes", post(calculate_routes))
        .route("/routes/compare", post(compare_routes))
        .with_state(planner)
}

async fn calculate_routes(
    State(planner): State<Arc<RoutePlanner>>,
    Json(request): Json<RouteRequest>,
) -> ApiResult<Vec<RouteOption>> {
    planner
        .calculate_routes(&request)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("Route calculation failed: {}", e);
            let status = match e {
                AirPathError::Validation { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(ApiError {
                    error: e.user_message(),
                }),
            )
        })
}

async fn compare_routes(
    State(planner): State<Arc<RoutePlanner>>,
    Json(payload): Json<CompareRequest>,
) -> Json<RouteComparison> {
    Json(planner.compare_routes(payload.routes, &payload.preferences))
}
