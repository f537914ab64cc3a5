//! Task mutations. Each create/update/delete recalculates the owning phase's progress
//! before it is reported as done.

use db::models::project_task::{CreateProjectTask, ProjectTask, UpdateProjectTask};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    access::{AccessError, authorize_phase},
    phase_sync::PhaseSync,
};

#[derive(Debug, Error)]
pub enum ProjectTaskError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to recalculate phase progress: {0}")]
    Recalculation(#[source] sqlx::Error),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("{0}")]
    Validation(String),
    #[error("Task not found")]
    TaskNotFound,
}

#[derive(Clone)]
pub struct ProjectTaskService {
    pool: SqlitePool,
    sync: PhaseSync,
}

impl ProjectTaskService {
    pub fn new(pool: SqlitePool, sync: PhaseSync) -> Self {
        Self { pool, sync }
    }

    /// Tasks of a phase in creation order.
    pub async fn list_tasks(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
        timeline_id: Uuid,
    ) -> Result<Vec<ProjectTask>, ProjectTaskError> {
        authorize_phase(&self.pool, idea_id, timeline_id, user_id).await?;
        Ok(ProjectTask::find_by_timeline_id(&self.pool, timeline_id).await?)
    }

    pub async fn create_task(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
        timeline_id: Uuid,
        data: &CreateProjectTask,
    ) -> Result<ProjectTask, ProjectTaskError> {
        validate_title(Some(&data.title))?;
        validate_percentage("completion_percentage", data.completion_percentage)?;
        validate_percentage("contribution_percentage", data.contribution_percentage)?;
        authorize_phase(&self.pool, idea_id, timeline_id, user_id).await?;

        let mut tx = self.pool.begin().await?;
        let task = ProjectTask::create(&mut *tx, timeline_id, data, Uuid::new_v4()).await?;
        let progress = self
            .sync
            .recalculate_in(&mut tx, timeline_id)
            .await
            .map_err(ProjectTaskError::Recalculation)?;
        tx.commit().await?;

        info!(
            task_id = %task.id,
            timeline_id = %timeline_id,
            contribution = task.contribution_percentage,
            completion = task.completion_percentage,
            "Task created"
        );
        self.publish(idea_id, timeline_id, progress);
        Ok(task)
    }

    pub async fn update_task(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
        timeline_id: Uuid,
        data: &UpdateProjectTask,
    ) -> Result<ProjectTask, ProjectTaskError> {
        if data.title.is_some() {
            validate_title(data.title.as_deref())?;
        }
        validate_percentage("completion_percentage", data.completion_percentage)?;
        validate_percentage("contribution_percentage", data.contribution_percentage)?;
        authorize_phase(&self.pool, idea_id, timeline_id, user_id).await?;

        let mut tx = self.pool.begin().await?;
        let task = ProjectTask::update(&mut *tx, timeline_id, data)
            .await?
            .ok_or(ProjectTaskError::TaskNotFound)?;
        let progress = self
            .sync
            .recalculate_in(&mut tx, timeline_id)
            .await
            .map_err(ProjectTaskError::Recalculation)?;
        tx.commit().await?;

        info!(
            task_id = %task.id,
            timeline_id = %timeline_id,
            status = %task.status,
            completion = task.completion_percentage,
            "Task updated"
        );
        self.publish(idea_id, timeline_id, progress);
        Ok(task)
    }

    pub async fn delete_task(
        &self,
        user_id: Uuid,
        idea_id: Uuid,
        timeline_id: Uuid,
        task_id: Uuid,
    ) -> Result<(), ProjectTaskError> {
        authorize_phase(&self.pool, idea_id, timeline_id, user_id).await?;

        let mut tx = self.pool.begin().await?;
        let removed = ProjectTask::delete(&mut *tx, task_id, timeline_id).await?;
        if removed == 0 {
            return Err(ProjectTaskError::TaskNotFound);
        }
        let progress = self
            .sync
            .recalculate_in(&mut tx, timeline_id)
            .await
            .map_err(ProjectTaskError::Recalculation)?;
        tx.commit().await?;

        info!(task_id = %task_id, timeline_id = %timeline_id, "Task deleted");
        self.publish(idea_id, timeline_id, progress);
        Ok(())
    }

    fn publish(&self, idea_id: Uuid, timeline_id: Uuid, progress: Option<i32>) {
        match progress {
            Some(progress) => self.sync.publish(idea_id, timeline_id, progress),
            None => debug!(timeline_id = %timeline_id, "Phase progress left unchanged"),
        }
    }
}

fn validate_title(title: Option<&str>) -> Result<(), ProjectTaskError> {
    match title {
        Some(title) if !title.trim().is_empty() => Ok(()),
        _ => Err(ProjectTaskError::Validation("Title is required".to_string())),
    }
}

fn validate_percentage(field: &str, value: Option<i32>) -> Result<(), ProjectTaskError> {
    match value {
        Some(v) if !(0..=100).contains(&v) => Err(ProjectTaskError::Validation(format!(
            "{field} must be between 0 and 100"
        ))),
        _ => Ok(()),
    }
}
