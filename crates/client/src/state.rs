use std::collections::HashMap;

use db::models::{project_task::ProjectTask, project_timeline::ProjectTimeline};
use uuid::Uuid;

/// What a timeline view renders: phases in `phase_number` order, each phase's tasks in
/// creation order, and the last inline error (cleared by the next successful call).
#[derive(Debug, Clone, Default)]
pub struct TimelineSnapshot {
    pub phases: Vec<ProjectTimeline>,
    pub tasks: HashMap<Uuid, Vec<ProjectTask>>,
    pub error: Option<String>,
}

impl TimelineSnapshot {
    pub fn phase(&self, phase_id: Uuid) -> Option<&ProjectTimeline> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    pub fn progress_of(&self, phase_id: Uuid) -> Option<i32> {
        self.phase(phase_id).map(|p| p.progress_percentage)
    }

    pub fn tasks_of(&self, phase_id: Uuid) -> &[ProjectTask] {
        self.tasks.get(&phase_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn set_phases(&mut self, phases: Vec<ProjectTimeline>) {
        // Drop task lists of phases that no longer exist.
        self.tasks
            .retain(|phase_id, _| phases.iter().any(|p| p.id == *phase_id));
        self.phases = phases;
    }
}
