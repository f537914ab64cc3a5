pub mod idea;
pub mod project_task;
pub mod project_timeline;
