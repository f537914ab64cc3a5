//! Routes for an idea's timeline phases.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::project_timeline::{
    CreateProjectTimeline, ProjectTimeline, UpdateProjectTimeline,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::SuccessResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    session::CurrentUser,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PhaseResponse {
    pub phase: ProjectTimeline,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PhasesResponse {
    pub phases: Vec<ProjectTimeline>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePhaseQuery {
    #[serde(rename = "phaseId")]
    pub phase_id: Option<Uuid>,
}

/// GET /api/business-plan/{idea_id}/timeline
pub async fn list_phases(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(idea_id): ApiPath<Uuid>,
) -> Result<ResponseJson<PhasesResponse>, ApiError> {
    let phases = state.timelines().list_phases(user_id, idea_id).await?;
    Ok(ResponseJson(PhasesResponse { phases }))
}

/// POST /api/business-plan/{idea_id}/timeline
pub async fn create_phase(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(idea_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateProjectTimeline>,
) -> Result<ResponseJson<PhaseResponse>, ApiError> {
    let phase = state
        .timelines()
        .create_phase(user_id, idea_id, &payload)
        .await?;
    Ok(ResponseJson(PhaseResponse { phase }))
}

/// PUT /api/business-plan/{idea_id}/timeline
pub async fn update_phase(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(idea_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateProjectTimeline>,
) -> Result<ResponseJson<PhaseResponse>, ApiError> {
    let phase = state
        .timelines()
        .update_phase(user_id, idea_id, &payload)
        .await?;
    Ok(ResponseJson(PhaseResponse { phase }))
}

/// DELETE /api/business-plan/{idea_id}/timeline?phaseId=...
pub async fn delete_phase(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(idea_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<DeletePhaseQuery>,
) -> Result<ResponseJson<SuccessResponse>, ApiError> {
    let phase_id = query
        .phase_id
        .ok_or_else(|| ApiError::BadRequest("Phase ID is required".to_string()))?;
    state
        .timelines()
        .delete_phase(user_id, idea_id, phase_id)
        .await?;
    Ok(ResponseJson(SuccessResponse::ok()))
}

/// POST /api/business-plan/{idea_id}/timeline/{timeline_id}/recalculate
/// Recompute a phase's progress from its current tasks.
pub async fn recalculate_phase(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath((idea_id, timeline_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<ResponseJson<PhaseResponse>, ApiError> {
    state
        .timelines()
        .get_phase(user_id, idea_id, timeline_id)
        .await?;
    state
        .phase_sync()
        .recalculate(&state.db().pool, timeline_id)
        .await?;
    let phase = state
        .timelines()
        .get_phase(user_id, idea_id, timeline_id)
        .await?;
    Ok(ResponseJson(PhaseResponse { phase }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/business-plan/{idea_id}/timeline",
            get(list_phases)
                .post(create_phase)
                .put(update_phase)
                .delete(delete_phase),
        )
        .route(
            "/business-plan/{idea_id}/timeline/{timeline_id}/recalculate",
            post(recalculate_phase),
        )
}
