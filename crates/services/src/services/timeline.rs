//! Phase-level operations for an idea's project timeline.

use db::models::project_timeline::{
    CreateProjectTimeline, PhaseStatus, ProjectTimeline, UpdateProjectTimeline,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::access::{AccessError, authorize_idea, authorize_phase};

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("{0}")]
    Validation(String),
}

#[derive(Clone)]
pub struct TimelineService {
    pool: SqlitePool,
    default_status: PhaseStatus,
}

impl TimelineService {
    pub fn new(pool: SqlitePool, default_status: PhaseStatus) -> Self {
        Self {
            pool,
            default_status,
        }
    }

    /// Phases ordered by `phase_number`.
    pub async fn list_phases(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
    ) -> Result<Vec<ProjectTimeline>, TimelineError> {
        authorize_idea(&self.pool, idea_id, user_id).await?;
        Ok(ProjectTimeline::find_by_idea_id(&self.pool, idea_id).await?)
    }

    pub async fn get_phase(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
        phase_id: Uuid,
    ) -> Result<ProjectTimeline, TimelineError> {
        Ok(authorize_phase(&self.pool, idea_id, phase_id, user_id).await?)
    }

    pub async fn create_phase(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
        data: &CreateProjectTimeline,
    ) -> Result<ProjectTimeline, TimelineError> {
        require("Phase name", &data.phase_name)?;
        require("Start date", &data.start_date)?;
        require("End date", &data.end_date)?;
        authorize_idea(&self.pool, idea_id, user_id).await?;

        if let Some(requested) = data.phase_number {
            debug!(requested, "Ignoring client-supplied phase_number");
        }

        let phase =
            ProjectTimeline::create(&self.pool, Uuid::new_v4(), idea_id, self.default_status, data)
                .await?;

        info!(
            idea_id = %idea_id,
            phase_id = %phase.id,
            phase_number = phase.phase_number,
            "Phase created"
        );
        Ok(phase)
    }

    /// Descriptive edit only. A `progress_percentage` in the request is ignored;
    /// progress is written solely by task recalculation.
    pub async fn update_phase(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
        data: &UpdateProjectTimeline,
    ) -> Result<ProjectTimeline, TimelineError> {
        for (field, value) in [
            ("Phase name", &data.phase_name),
            ("Start date", &data.start_date),
            ("End date", &data.end_date),
        ] {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        authorize_phase(&self.pool, idea_id, data.id, user_id).await?;

        if let Some(requested) = data.progress_percentage {
            debug!(phase_id = %data.id, requested, "Ignoring client-supplied progress_percentage");
        }

        let phase = ProjectTimeline::update(&self.pool, idea_id, data)
            .await?
            .ok_or(AccessError::PhaseNotFound)?;

        info!(idea_id = %idea_id, phase_id = %phase.id, status = %phase.status, "Phase updated");
        Ok(phase)
    }

    /// Owned tasks are removed by the store's cascade.
    pub async fn delete_phase(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
        phase_id: Uuid,
    ) -> Result<(), TimelineError> {
        authorize_phase(&self.pool, idea_id, phase_id, user_id).await?;

        let removed = ProjectTimeline::delete(&self.pool, phase_id, idea_id).await?;
        if removed == 0 {
            return Err(AccessError::PhaseNotFound.into());
        }

        info!(idea_id = %idea_id, phase_id = %phase_id, "Phase deleted");
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<(), TimelineError> {
    if value.trim().is_empty() {
        return Err(TimelineError::Validation(format!("{field} is required")));
    }
    Ok(())
}
