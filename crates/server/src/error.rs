use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use services::services::{
    access::AccessError, project_task::ProjectTaskError, timeline::TimelineError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    ProjectTask(#[from] ProjectTaskError),
    #[error(transparent)]
    Timeline(#[from] TimelineError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn access_status(err: &AccessError) -> (StatusCode, String) {
    match err {
        AccessError::IdeaNotFound | AccessError::PhaseNotFound => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        AccessError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
        AccessError::Database(e) => {
            error!(error = %e, "Ownership check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ProjectTask(err) => match err {
                ProjectTaskError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                ProjectTaskError::TaskNotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ProjectTaskError::Access(access) => access_status(access),
                ProjectTaskError::Recalculation(e) => {
                    error!(error = %e, "Phase progress recalculation failed, task write rolled back");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to update phase progress".to_string(),
                    )
                }
                ProjectTaskError::Database(e) => {
                    error!(error = %e, "Task write failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to save task".to_string(),
                    )
                }
            },
            ApiError::Timeline(err) => match err {
                TimelineError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                TimelineError::Access(access) => access_status(access),
                TimelineError::Database(e) => {
                    error!(error = %e, "Phase write failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to save phase".to_string(),
                    )
                }
            },
            ApiError::Access(err) => access_status(err),
            ApiError::Database(e) => {
                error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, ResponseJson(ErrorResponse::new(message))).into_response()
    }
}
