//! Client-side view models for the timeline planner.
//!
//! Both view models treat the server as the only source of phase progress: after
//! their own mutations they re-fetch the affected task list and the phase list, and
//! never publish a locally computed progress value.

pub mod api;
pub mod business_plan;
pub mod config;
pub mod error;
pub mod planner;
mod state;

pub use api::{HttpTimelineApi, TimelineApi};
pub use business_plan::BusinessPlanEditor;
pub use config::ClientConfig;
pub use error::ClientError;
pub use planner::{PollHandle, ProjectPlanner};
pub use state::TimelineSnapshot;

#[cfg(test)]
mod test_support;
