//! Phase progress calculation.
//!
//! The stored formula is a weighted sum that is *not* normalised by the total
//! contribution: a phase whose task contributions add up to 80 tops out at 80% even
//! when every task is complete, and contributions above 100 can push the raw value
//! past 100.

use db::models::project_task::ProjectTask;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Anything that carries a completion and a contribution percentage.
pub trait WeightedProgress {
    fn completion_percentage(&self) -> i32;
    fn contribution_percentage(&self) -> i32;
}

impl WeightedProgress for ProjectTask {
    fn completion_percentage(&self) -> i32 {
        self.completion_percentage
    }

    fn contribution_percentage(&self) -> i32 {
        self.contribution_percentage
    }
}

impl WeightedProgress for (i32, i32) {
    /// `(contribution, completion)`
    fn completion_percentage(&self) -> i32 {
        self.1
    }

    fn contribution_percentage(&self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProgressMode {
    /// `round(Σ contribution/100 × completion)`
    #[default]
    Weighted,
    /// Weighted sum divided by total contribution; plain average when every
    /// contribution is zero.
    Normalized,
}

/// Weighted progress of a task set. `None` for an empty set, in which case the
/// phase keeps whatever progress it already had.
///
/// The result is the raw sum and may exceed 100.
pub fn compute_progress<T: WeightedProgress>(tasks: &[T]) -> Option<i32> {
    if tasks.is_empty() {
        return None;
    }

    let total: f64 = tasks
        .iter()
        .map(|t| (t.contribution_percentage() as f64 / 100.0) * t.completion_percentage() as f64)
        .sum();

    Some(total.round() as i32)
}

/// Unweighted mean of task completion.
pub fn average_completion<T: WeightedProgress>(tasks: &[T]) -> Option<i32> {
    if tasks.is_empty() {
        return None;
    }

    let sum: i64 = tasks.iter().map(|t| t.completion_percentage() as i64).sum();
    Some((sum as f64 / tasks.len() as f64).round() as i32)
}

pub fn compute_progress_with_mode<T: WeightedProgress>(mode: ProgressMode, tasks: &[T]) -> Option<i32> {
    match mode {
        ProgressMode::Weighted => compute_progress(tasks),
        ProgressMode::Normalized => {
            let weight = contribution_total(tasks);
            if weight == 0 {
                return average_completion(tasks);
            }
            let weighted: i64 = tasks
                .iter()
                .map(|t| t.contribution_percentage() as i64 * t.completion_percentage() as i64)
                .sum();
            Some((weighted as f64 / weight as f64).round() as i32)
        }
    }
}

pub fn contribution_total<T: WeightedProgress>(tasks: &[T]) -> i64 {
    tasks.iter().map(|t| t.contribution_percentage() as i64).sum()
}

/// Value actually stored on the phase (`0..=100`).
pub fn clamp_percentage(value: i32) -> i32 {
    value.clamp(0, 100)
}
