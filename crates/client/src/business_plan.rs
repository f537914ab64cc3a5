//! Business plan editor view model. Edits phases and tasks without a background poll
//! or optimistic updates; every change is followed by a re-fetch.

use std::sync::Arc;

use db::models::{
    project_task::{CreateProjectTask, ProjectTask, UpdateProjectTask},
    project_timeline::{CreateProjectTimeline, ProjectTimeline, UpdateProjectTimeline},
};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::{api::TimelineApi, error::ClientError, state::TimelineSnapshot};

pub struct BusinessPlanEditor {
    api: Arc<dyn TimelineApi>,
    idea_id: Uuid,
    state: RwLock<TimelineSnapshot>,
}

impl BusinessPlanEditor {
    pub fn new(api: Arc<dyn TimelineApi>, idea_id: Uuid) -> Self {
        Self {
            api,
            idea_id,
            state: RwLock::new(TimelineSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> TimelineSnapshot {
        self.state.read().await.clone()
    }

    /// Inline message for the last failed call, if it has not been superseded.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    async fn record<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        let mut state = self.state.write().await;
        match &result {
            Ok(_) => state.error = None,
            Err(e) => state.error = Some(e.to_string()),
        }
        result
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let phases = self.record(self.api.list_phases(self.idea_id).await).await?;
        let mut tasks = Vec::with_capacity(phases.len());
        for phase in &phases {
            let list = self
                .record(self.api.list_tasks(self.idea_id, phase.id).await)
                .await?;
            tasks.push((phase.id, list));
        }

        let mut state = self.state.write().await;
        state.set_phases(phases);
        state.tasks.extend(tasks);
        Ok(())
    }

    async fn refetch_phases(&self) {
        match self.api.list_phases(self.idea_id).await {
            Ok(phases) => self.state.write().await.set_phases(phases),
            Err(e) => {
                warn!(idea_id = %self.idea_id, error = %e, "Failed to re-fetch phases");
                self.state.write().await.error = Some(e.to_string());
            }
        }
    }

    async fn refetch_phase(&self, phase_id: Uuid) {
        match self.api.list_tasks(self.idea_id, phase_id).await {
            Ok(tasks) => {
                self.state.write().await.tasks.insert(phase_id, tasks);
                self.refetch_phases().await;
            }
            Err(e) => {
                warn!(phase_id = %phase_id, error = %e, "Failed to re-fetch tasks");
                self.state.write().await.error = Some(e.to_string());
            }
        }
    }

    pub async fn add_phase(&self, data: &CreateProjectTimeline) -> Result<ProjectTimeline, ClientError> {
        let phase = self
            .record(self.api.create_phase(self.idea_id, data).await)
            .await?;
        self.refetch_phases().await;
        Ok(phase)
    }

    pub async fn update_phase(&self, data: &UpdateProjectTimeline) -> Result<ProjectTimeline, ClientError> {
        let phase = self
            .record(self.api.update_phase(self.idea_id, data).await)
            .await?;
        self.refetch_phases().await;
        Ok(phase)
    }

    /// Deletes a phase and its tasks. The caller must pass the user's confirmation.
    pub async fn delete_phase(&self, phase_id: Uuid, confirmed: bool) -> Result<(), ClientError> {
        if !confirmed {
            return Err(ClientError::NotConfirmed);
        }
        self.record(self.api.delete_phase(self.idea_id, phase_id).await)
            .await?;
        self.refetch_phases().await;
        Ok(())
    }

    pub async fn add_task(
        &self,
        phase_id: Uuid,
        data: &CreateProjectTask,
    ) -> Result<ProjectTask, ClientError> {
        let task = self
            .record(self.api.create_task(self.idea_id, phase_id, data).await)
            .await?;
        self.refetch_phase(phase_id).await;
        Ok(task)
    }

    pub async fn update_task(
        &self,
        phase_id: Uuid,
        data: &UpdateProjectTask,
    ) -> Result<ProjectTask, ClientError> {
        let task = self
            .record(self.api.update_task(self.idea_id, phase_id, data).await)
            .await?;
        self.refetch_phase(phase_id).await;
        Ok(task)
    }

    pub async fn delete_task(&self, phase_id: Uuid, task_id: Uuid) -> Result<(), ClientError> {
        self.record(self.api.delete_task(self.idea_id, phase_id, task_id).await)
            .await?;
        self.refetch_phase(phase_id).await;
        Ok(())
    }
}
