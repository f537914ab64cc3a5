use std::sync::Arc;

use db::DBService;
use services::services::{
    config::Config, phase_sync::PhaseSync, project_task::ProjectTaskService,
    timeline::TimelineService,
};

use crate::session::SessionResolver;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    phase_sync: PhaseSync,
    timelines: TimelineService,
    tasks: ProjectTaskService,
    sessions: Arc<dyn SessionResolver>,
}

impl AppState {
    pub fn new(db: DBService, config: &Config, sessions: Arc<dyn SessionResolver>) -> Self {
        let phase_sync = PhaseSync::new(config.progress_mode);
        let timelines = TimelineService::new(db.pool.clone(), config.default_phase_status);
        let tasks = ProjectTaskService::new(db.pool.clone(), phase_sync.clone());
        Self {
            db,
            phase_sync,
            timelines,
            tasks,
            sessions,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn phase_sync(&self) -> &PhaseSync {
        &self.phase_sync
    }

    pub fn timelines(&self) -> &TimelineService {
        &self.timelines
    }

    pub fn tasks(&self) -> &ProjectTaskService {
        &self.tasks
    }

    pub fn sessions(&self) -> &dyn SessionResolver {
        self.sessions.as_ref()
    }
}
