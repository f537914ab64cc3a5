//! Routes for the tasks of one timeline phase. Every mutation recalculates the
//! phase's progress before responding.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::project_task::{CreateProjectTask, ProjectTask, UpdateProjectTask};
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
pub struct TaskResponse {
    pub task: ProjectTask,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TasksResponse {
    pub tasks: Vec<ProjectTask>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTaskQuery {
    #[serde(rename = "taskId")]
    pub task_id: Option<Uuid>,
}

/// GET /api/business-plan/{idea_id}/timeline/{timeline_id}/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath((idea_id, timeline_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<ResponseJson<TasksResponse>, ApiError> {
    let tasks = state
        .tasks()
        .list_tasks(user_id, idea_id, timeline_id)
        .await?;
    Ok(ResponseJson(TasksResponse { tasks }))
}

pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath((idea_id, timeline_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<CreateProjectTask>,
) -> Result<ResponseJson<TaskResponse>, ApiError> {
    let task = state
        .tasks()
        .create_task(user_id, idea_id, timeline_id, &payload)
        .await?;
    Ok(ResponseJson(TaskResponse { task }))
}

pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath((idea_id, timeline_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<UpdateProjectTask>,
) -> Result<ResponseJson<TaskResponse>, ApiError> {
    let task = state
        .tasks()
        .update_task(user_id, idea_id, timeline_id, &payload)
        .await?;
    Ok(ResponseJson(TaskResponse { task }))
}

/// DELETE .../tasks?taskId=...
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath((idea_id, timeline_id)): ApiPath<(Uuid, Uuid)>,
    ApiQuery(query): ApiQuery<DeleteTaskQuery>,
) -> Result<ResponseJson<SuccessResponse>, ApiError> {
    let task_id = query
        .task_id
        .ok_or_else(|| ApiError::BadRequest("Task ID is required".to_string()))?;
    state
        .tasks()
        .delete_task(user_id, idea_id, timeline_id, task_id)
        .await?;
    Ok(ResponseJson(SuccessResponse::ok()))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/business-plan/{idea_id}/timeline/{timeline_id}/tasks",
        get(list_tasks)
            .post(create_task)
            .put(update_task)
            .delete(delete_task),
    )
}
