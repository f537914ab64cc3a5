use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utils::response::SuccessResponse;

use crate::{AppState, error::ApiError};

pub mod project_tasks;
pub mod timeline;

pub async fn health(State(state): State<AppState>) -> Result<ResponseJson<SuccessResponse>, ApiError> {
    sqlx::query("SELECT 1").execute(&state.db().pool).await?;
    Ok(ResponseJson(SuccessResponse::ok()))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(timeline::router())
        .merge(project_tasks::router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
