pub mod access;
pub mod config;
pub mod phase_sync;
pub mod progress;
pub mod project_task;
pub mod timeline;
