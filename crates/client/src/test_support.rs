//! In-memory `TimelineApi` that derives phase progress the way the server does.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use db::models::{
    project_task::{CreateProjectTask, ProjectTask, UpdateProjectTask},
    project_timeline::{CreateProjectTimeline, PhaseStatus, ProjectTimeline, UpdateProjectTimeline},
};
use services::services::progress::{clamp_percentage, compute_progress};
use uuid::Uuid;

use crate::{api::TimelineApi, error::ClientError};

#[derive(Default)]
struct Store {
    phases: Vec<ProjectTimeline>,
    tasks: Vec<ProjectTask>,
}

impl Store {
    fn recalculate(&mut self, phase_id: Uuid) {
        let tasks: Vec<ProjectTask> = self
            .tasks
            .iter()
            .filter(|t| t.timeline_id == phase_id)
            .cloned()
            .collect();
        let Some(progress) = compute_progress(&tasks) else {
            return;
        };
        if let Some(phase) = self.phases.iter_mut().find(|p| p.id == phase_id) {
            phase.progress_percentage = clamp_percentage(progress);
        }
    }
}

#[derive(Default)]
pub struct FakeTimelineApi {
    store: Mutex<Store>,
    pub fail_task_writes: AtomicBool,
    pub fail_phase_writes: AtomicBool,
    pub phase_list_calls: AtomicUsize,
}

fn server_error(message: &str) -> ClientError {
    ClientError::Api {
        status: 500,
        message: message.to_string(),
    }
}

fn not_found(message: &str) -> ClientError {
    ClientError::Api {
        status: 404,
        message: message.to_string(),
    }
}

impl FakeTimelineApi {
    pub fn insert_phase(&self, idea_id: Uuid, name: &str) -> Uuid {
        let mut store = self.store.lock().unwrap();
        let phase_number = store.phases.iter().filter(|p| p.idea_id == idea_id).count() as i32 + 1;
        let now = Utc::now();
        let phase = ProjectTimeline {
            id: Uuid::new_v4(),
            idea_id,
            phase_number,
            phase_name: name.to_string(),
            start_date: "2025-01-01".to_string(),
            end_date: "2025-03-31".to_string(),
            objectives: None,
            deliverables: None,
            resources_needed: None,
            status: PhaseStatus::default(),
            progress_percentage: 0,
            created_at: now,
            updated_at: now,
        };
        let id = phase.id;
        store.phases.push(phase);
        id
    }

    /// A task written by some other session.
    pub fn insert_task(&self, phase_id: Uuid, contribution: i32, completion: i32) -> Uuid {
        let mut store = self.store.lock().unwrap();
        let task = new_task(phase_id, &CreateProjectTask::weighted("external", contribution, completion));
        let id = task.id;
        store.tasks.push(task);
        store.recalculate(phase_id);
        id
    }

    pub fn phase_count(&self) -> usize {
        self.store.lock().unwrap().phases.len()
    }
}

fn new_task(phase_id: Uuid, data: &CreateProjectTask) -> ProjectTask {
    let now = Utc::now();
    ProjectTask {
        id: Uuid::new_v4(),
        timeline_id: phase_id,
        title: data.title.clone(),
        description: data.description.clone(),
        status: data.status.unwrap_or_default(),
        completion_percentage: data.completion_percentage.unwrap_or(0),
        contribution_percentage: data.contribution_percentage.unwrap_or(0),
        priority: data.priority.unwrap_or_default(),
        due_date: data.due_date,
        assigned_to: data.assigned_to,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl TimelineApi for FakeTimelineApi {
    async fn list_phases(&self, idea_id: Uuid) -> Result<Vec<ProjectTimeline>, ClientError> {
        self.phase_list_calls.fetch_add(1, Ordering::SeqCst);
        let store = self.store.lock().unwrap();
        let mut phases: Vec<_> = store.phases.iter().filter(|p| p.idea_id == idea_id).cloned().collect();
        phases.sort_by_key(|p| p.phase_number);
        Ok(phases)
    }

    async fn create_phase(
        &self,
        idea_id: Uuid,
        data: &CreateProjectTimeline,
    ) -> Result<ProjectTimeline, ClientError> {
        if self.fail_phase_writes.load(Ordering::SeqCst) {
            return Err(server_error("Failed to save phase"));
        }
        if data.phase_name.trim().is_empty() {
            return Err(ClientError::Api {
                status: 400,
                message: "Phase name is required".to_string(),
            });
        }
        let id = self.insert_phase(idea_id, &data.phase_name);
        let store = self.store.lock().unwrap();
        Ok(store.phases.iter().find(|p| p.id == id).cloned().unwrap())
    }

    async fn update_phase(
        &self,
        idea_id: Uuid,
        data: &UpdateProjectTimeline,
    ) -> Result<ProjectTimeline, ClientError> {
        if self.fail_phase_writes.load(Ordering::SeqCst) {
            return Err(server_error("Failed to save phase"));
        }
        let mut store = self.store.lock().unwrap();
        let phase = store
            .phases
            .iter_mut()
            .find(|p| p.id == data.id && p.idea_id == idea_id)
            .ok_or_else(|| not_found("Phase not found"))?;
        if let Some(name) = &data.phase_name {
            phase.phase_name = name.clone();
        }
        if let Some(objectives) = &data.objectives {
            phase.objectives = objectives.clone();
        }
        if let Some(status) = data.status {
            phase.status = status;
        }
        Ok(phase.clone())
    }

    async fn delete_phase(&self, idea_id: Uuid, phase_id: Uuid) -> Result<(), ClientError> {
        if self.fail_phase_writes.load(Ordering::SeqCst) {
            return Err(server_error("Failed to save phase"));
        }
        let mut store = self.store.lock().unwrap();
        let before = store.phases.len();
        store.phases.retain(|p| !(p.id == phase_id && p.idea_id == idea_id));
        if store.phases.len() == before {
            return Err(not_found("Phase not found"));
        }
        store.tasks.retain(|t| t.timeline_id != phase_id);
        Ok(())
    }

    async fn list_tasks(&self, _idea_id: Uuid, phase_id: Uuid) -> Result<Vec<ProjectTask>, ClientError> {
        let store = self.store.lock().unwrap();
        Ok(store.tasks.iter().filter(|t| t.timeline_id == phase_id).cloned().collect())
    }

    async fn create_task(
        &self,
        _idea_id: Uuid,
        phase_id: Uuid,
        data: &CreateProjectTask,
    ) -> Result<ProjectTask, ClientError> {
        if self.fail_task_writes.load(Ordering::SeqCst) {
            return Err(server_error("Failed to save task"));
        }
        let mut store = self.store.lock().unwrap();
        if !store.phases.iter().any(|p| p.id == phase_id) {
            return Err(not_found("Phase not found"));
        }
        let task = new_task(phase_id, data);
        store.tasks.push(task.clone());
        store.recalculate(phase_id);
        Ok(task)
    }

    async fn update_task(
        &self,
        _idea_id: Uuid,
        phase_id: Uuid,
        data: &UpdateProjectTask,
    ) -> Result<ProjectTask, ClientError> {
        if self.fail_task_writes.load(Ordering::SeqCst) {
            return Err(server_error("Failed to save task"));
        }
        let mut store = self.store.lock().unwrap();
        let task = store
            .tasks
            .iter_mut()
            .find(|t| t.id == data.id && t.timeline_id == phase_id)
            .ok_or_else(|| not_found("Task not found"))?;
        if let Some(status) = data.status {
            task.status = status;
        }
        if let Some(completion) = data.completion_percentage {
            task.completion_percentage = completion;
        }
        if let Some(contribution) = data.contribution_percentage {
            task.contribution_percentage = contribution;
        }
        if let Some(title) = &data.title {
            task.title = title.clone();
        }
        let task = task.clone();
        store.recalculate(phase_id);
        Ok(task)
    }

    async fn delete_task(&self, _idea_id: Uuid, phase_id: Uuid, task_id: Uuid) -> Result<(), ClientError> {
        if self.fail_task_writes.load(Ordering::SeqCst) {
            return Err(server_error("Failed to save task"));
        }
        let mut store = self.store.lock().unwrap();
        let before = store.tasks.len();
        store.tasks.retain(|t| !(t.id == task_id && t.timeline_id == phase_id));
        if store.tasks.len() == before {
            return Err(not_found("Task not found"));
        }
        store.recalculate(phase_id);
        Ok(())
    }
}
