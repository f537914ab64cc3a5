//! Ownership checks. Every timeline read or write goes through here before touching rows.

use db::models::{idea::Idea, project_timeline::ProjectTimeline};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Idea not found")]
    IdeaNotFound,
    #[error("Phase not found")]
    PhaseNotFound,
    #[error("You do not have permission to modify this idea")]
    Forbidden,
}

/// Load the idea and check that `user_id` owns it.
pub async fn authorize_idea(
    pool: &SqlitePool,
    idea_id: Uuid,
    user_id: Uuid,
) -> Result<Idea, AccessError> {
    let idea = Idea::find_by_id(pool, idea_id)
        .await?
        .ok_or(AccessError::IdeaNotFound)?;

    if !idea.is_owned_by(user_id) {
        warn!(
            idea_id = %idea_id,
            user_id = %user_id,
            "Rejected access to idea owned by another user"
        );
        return Err(AccessError::Forbidden);
    }

    Ok(idea)
}

/// Ownership check plus "this phase belongs to this idea".
pub async fn authorize_phase(
    pool: &SqlitePool,
    idea_id: Uuid,
    phase_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectTimeline, AccessError> {
    authorize_idea(pool, idea_id, user_id).await?;

    ProjectTimeline::find_by_id(pool, phase_id)
        .await?
        .filter(|phase| phase.idea_id == idea_id)
        .ok_or(AccessError::PhaseNotFound)
}
