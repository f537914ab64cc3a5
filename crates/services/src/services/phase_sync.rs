//! Keeps `project_timelines.progress_percentage` in step with the phase's tasks.
//!
//! Recalculation is a read-tasks / compute / write-phase sequence that always runs inside
//! the same SQLite transaction as the task write that triggered it. Because that
//! transaction's first statement is a write it holds the database write lock
//! throughout, so two concurrent task mutations on one phase serialize instead of
//! recalculating from stale task sets.

use db::models::{project_task::ProjectTask, project_timeline::ProjectTimeline};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::progress::{ProgressMode, clamp_percentage, compute_progress_with_mode, contribution_total};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Emitted after a recalculated progress value has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProgressUpdate {
    pub idea_id: Uuid,
    pub phase_id: Uuid,
    pub progress_percentage: i32,
}

#[derive(Debug, Clone)]
pub struct PhaseSync {
    mode: ProgressMode,
    updates: broadcast::Sender<PhaseProgressUpdate>,
}

impl PhaseSync {
    pub fn new(mode: ProgressMode) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self { mode, updates }
    }

    pub fn mode(&self) -> ProgressMode {
        self.mode
    }

    /// In-process listeners for committed progress changes.
    pub fn subscribe(&self) -> broadcast::Receiver<PhaseProgressUpdate> {
        self.updates.subscribe()
    }

    /// Recompute and persist a phase's progress on `conn`, normally an open
    /// transaction. Returns the stored value, or `None` when the phase has no tasks
    /// and its progress was left as it was.
    pub async fn recalculate_in(
        &self,
        conn: &mut SqliteConnection,
        phase_id: Uuid,
    ) -> Result<Option<i32>, sqlx::Error> {
        let tasks = ProjectTask::find_by_timeline_id(&mut *conn, phase_id).await?;

        let Some(raw) = compute_progress_with_mode(self.mode, &tasks) else {
            debug!(phase_id = %phase_id, "No tasks left, keeping current phase progress");
            return Ok(None);
        };

        let contributions = contribution_total(&tasks);
        if contributions > 100 {
            warn!(
                phase_id = %phase_id,
                contributions,
                raw_progress = raw,
                "Task contributions exceed 100%, storing clamped progress"
            );
        }

        let stored = clamp_percentage(raw);
        let rows = ProjectTimeline::update_progress(&mut *conn, phase_id, stored).await?;
        if rows == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        debug!(
            phase_id = %phase_id,
            task_count = tasks.len(),
            progress = stored,
            "Recalculated phase progress"
        );
        Ok(Some(stored))
    }

    /// Standalone recalculation in its own transaction. Idempotent; useful to heal a
    /// phase whose tasks were changed outside this service.
    pub async fn recalculate(
        &self,
        pool: &SqlitePool,
        phase_id: Uuid,
    ) -> Result<Option<i32>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Take the write lock before reading tasks.
        sqlx::query("UPDATE project_timelines SET updated_at = updated_at WHERE id = $1")
            .bind(phase_id)
            .execute(&mut *tx)
            .await?;

        let progress = self.recalculate_in(&mut tx, phase_id).await?;
        tx.commit().await?;

        if let Some(progress) = progress {
            if let Some(phase) = ProjectTimeline::find_by_id(pool, phase_id).await? {
                self.publish(phase.idea_id, phase_id, progress);
            }
        }
        Ok(progress)
    }

    pub fn publish(&self, idea_id: Uuid, phase_id: Uuid, progress_percentage: i32) {
        info!(
            idea_id = %idea_id,
            phase_id = %phase_id,
            progress = progress_percentage,
            "Phase progress updated"
        );
        // No subscribers is fine.
        let _ = self.updates.send(PhaseProgressUpdate {
            idea_id,
            phase_id,
            progress_percentage,
        });
    }
}

impl Default for PhaseSync {
    fn default() -> Self {
        Self::new(ProgressMode::default())
    }
}
