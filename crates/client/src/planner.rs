//! Project planner view model: phases with their task lists, optimistic status
//! changes, and a background poll that picks up progress changed by other sessions.

use std::{sync::Arc, time::Duration};

use db::models::{
    project_task::{CreateProjectTask, ProjectTask, TaskStatus, UpdateProjectTask},
    project_timeline::{CreateProjectTimeline, ProjectTimeline, UpdateProjectTimeline},
};
use tokio::{
    sync::{RwLock, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{api::TimelineApi, error::ClientError, state::TimelineSnapshot};

#[derive(Clone)]
pub struct ProjectPlanner {
    api: Arc<dyn TimelineApi>,
    idea_id: Uuid,
    state: Arc<RwLock<TimelineSnapshot>>,
    updates: Arc<watch::Sender<TimelineSnapshot>>,
}

impl ProjectPlanner {
    pub fn new(api: Arc<dyn TimelineApi>, idea_id: Uuid) -> Self {
        let (updates, _) = watch::channel(TimelineSnapshot::default());
        Self {
            api,
            idea_id,
            state: Arc::new(RwLock::new(TimelineSnapshot::default())),
            updates: Arc::new(updates),
        }
    }

    pub fn idea_id(&self) -> Uuid {
        self.idea_id
    }

    pub async fn snapshot(&self) -> TimelineSnapshot {
        self.state.read().await.clone()
    }

    /// Receives every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<TimelineSnapshot> {
        self.updates.subscribe()
    }

    async fn publish(&self) {
        let snapshot = self.state.read().await.clone();
        self.updates.send_replace(snapshot);
    }

    async fn fail(&self, err: ClientError) -> ClientError {
        self.state.write().await.error = Some(err.to_string());
        self.publish().await;
        err
    }

    async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Fetch phases and every phase's tasks.
    pub async fn load(&self) -> Result<(), ClientError> {
        self.refresh_phases().await?;
        let phase_ids: Vec<Uuid> = self.state.read().await.phases.iter().map(|p| p.id).collect();
        for phase_id in phase_ids {
            self.refresh_tasks(phase_id).await?;
        }
        Ok(())
    }

    pub async fn refresh_phases(&self) -> Result<(), ClientError> {
        match self.api.list_phases(self.idea_id).await {
            Ok(phases) => {
                self.state.write().await.set_phases(phases);
                self.publish().await;
                Ok(())
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    pub async fn refresh_tasks(&self, phase_id: Uuid) -> Result<(), ClientError> {
        match self.api.list_tasks(self.idea_id, phase_id).await {
            Ok(tasks) => {
                self.state.write().await.tasks.insert(phase_id, tasks);
                self.publish().await;
                Ok(())
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Re-read server state after one of our own task mutations.
    async fn resync_after_task_change(&self, phase_id: Uuid) {
        self.clear_error().await;
        if let Err(e) = self.refresh_tasks(phase_id).await {
            warn!(phase_id = %phase_id, error = %e, "Failed to re-fetch tasks after mutation");
            return;
        }
        if let Err(e) = self.refresh_phases().await {
            warn!(phase_id = %phase_id, error = %e, "Failed to re-fetch phases after mutation");
        }
    }

    pub async fn add_task(
        &self,
        phase_id: Uuid,
        data: &CreateProjectTask,
    ) -> Result<ProjectTask, ClientError> {
        match self.api.create_task(self.idea_id, phase_id, data).await {
            Ok(task) => {
                self.resync_after_task_change(phase_id).await;
                Ok(task)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    pub async fn update_task(
        &self,
        phase_id: Uuid,
        data: &UpdateProjectTask,
    ) -> Result<ProjectTask, ClientError> {
        match self.api.update_task(self.idea_id, phase_id, data).await {
            Ok(task) => {
                self.resync_after_task_change(phase_id).await;
                Ok(task)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Move a task to `status` with its suggested completion. The task list shows the
    /// change immediately and is restored if the server rejects it. Phase progress is
    /// left alone until the server's value is re-fetched.
    pub async fn set_task_status(
        &self,
        phase_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<ProjectTask, ClientError> {
        let previous = {
            let mut state = self.state.write().await;
            let Some(tasks) = state.tasks.get_mut(&phase_id) else {
                drop(state);
                return Err(self.fail(ClientError::UnknownPhase(phase_id)).await);
            };
            let previous = tasks.clone();
            if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
                task.status = status;
                task.completion_percentage = status.suggested_completion();
            }
            previous
        };
        self.publish().await;

        let change = UpdateProjectTask::status_change(task_id, status);
        match self.api.update_task(self.idea_id, phase_id, &change).await {
            Ok(task) => {
                self.resync_after_task_change(phase_id).await;
                Ok(task)
            }
            Err(e) => {
                debug!(task_id = %task_id, error = %e, "Reverting optimistic status change");
                self.state.write().await.tasks.insert(phase_id, previous);
                Err(self.fail(e).await)
            }
        }
    }

    pub async fn delete_task(&self, phase_id: Uuid, task_id: Uuid) -> Result<(), ClientError> {
        match self.api.delete_task(self.idea_id, phase_id, task_id).await {
            Ok(()) => {
                self.resync_after_task_change(phase_id).await;
                Ok(())
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    pub async fn add_phase(&self, data: &CreateProjectTimeline) -> Result<ProjectTimeline, ClientError> {
        match self.api.create_phase(self.idea_id, data).await {
            Ok(phase) => {
                self.clear_error().await;
                if let Err(e) = self.refresh_phases().await {
                    warn!(error = %e, "Failed to re-fetch phases after adding a phase");
                }
                Ok(phase)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    pub async fn update_phase(&self, data: &UpdateProjectTimeline) -> Result<ProjectTimeline, ClientError> {
        match self.api.update_phase(self.idea_id, data).await {
            Ok(phase) => {
                self.clear_error().await;
                if let Err(e) = self.refresh_phases().await {
                    warn!(error = %e, "Failed to re-fetch phases after updating a phase");
                }
                Ok(phase)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Start refreshing phase progress every `period`. The poll runs until the
    /// returned handle is stopped or dropped.
    pub fn start_polling(&self, period: Duration) -> PollHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let planner = self.clone();

        info!(idea_id = %self.idea_id, ?period, "Starting phase progress poll");
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the view has just loaded.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = planner.refresh_phases().await {
                            warn!(idea_id = %planner.idea_id, error = %e, "Phase poll failed");
                        }
                    }
                }
            }
            debug!(idea_id = %planner.idea_id, "Phase progress poll stopped");
        });

        PollHandle {
            token,
            handle: Some(handle),
        }
    }
}

/// Owns the background poll; tie it to the view's lifetime.
pub struct PollHandle {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the poll and wait for it to exit.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
