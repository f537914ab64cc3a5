use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Advisory phase status. Never derived from tasks.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "phase_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    Planned,
    Upcoming,
    InProgress,
    Completed,
}

/// One phase of an idea's project timeline (`project_timelines`).
///
/// `progress_percentage` is derived from the phase's tasks and only ever written by
/// [`ProjectTimeline::update_progress`].
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ProjectTimeline {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub phase_number: i32,
    pub phase_name: String,
    pub start_date: String,
    pub end_date: String,
    pub objectives: Option<String>,
    pub deliverables: Option<String>,
    pub resources_needed: Option<String>,
    pub status: PhaseStatus,
    pub progress_percentage: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateProjectTimeline {
    #[serde(default)]
    pub phase_name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub objectives: Option<String>,
    pub deliverables: Option<String>,
    pub resources_needed: Option<String>,
    /// Accepted for compatibility; the server assigns the number.
    pub phase_number: Option<i32>,
}

/// Partial phase edit. Unknown fields of a full phase object are ignored; an explicit
/// `null` clears one of the optional text columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProjectTimeline {
    pub id: Uuid,
    pub phase_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[ts(optional)]
    pub objectives: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[ts(optional)]
    pub deliverables: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[ts(optional)]
    pub resources_needed: Option<Option<String>>,
    pub status: Option<PhaseStatus>,
    /// Accepted but never applied; progress comes from tasks.
    pub progress_percentage: Option<i32>,
}

const TIMELINE_COLUMNS: &str = "id, idea_id, phase_number, phase_name, start_date, end_date, objectives, deliverables, resources_needed, status, progress_percentage, created_at, updated_at";

impl ProjectTimeline {
    /// Insert a phase numbered `count(existing phases of the idea) + 1`.
    ///
    /// The number is computed inside the INSERT so concurrent creates on one idea
    /// cannot both observe the same count.
    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        idea_id: Uuid,
        status: PhaseStatus,
        data: &CreateProjectTimeline,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, ProjectTimeline>(&format!(
            r#"INSERT INTO project_timelines
                   (id, idea_id, phase_number, phase_name, start_date, end_date, objectives, deliverables, resources_needed, status, progress_percentage, created_at, updated_at)
               VALUES ($1, $2,
                       (SELECT COUNT(*) + 1 FROM project_timelines WHERE idea_id = $2),
                       $3, $4, $5, $6, $7, $8, $9, 0, $10, $10)
               RETURNING {TIMELINE_COLUMNS}"#
        ))
        .bind(id)
        .bind(idea_id)
        .bind(&data.phase_name)
        .bind(&data.start_date)
        .bind(&data.end_date)
        .bind(data.objectives.is_some())
        .bind(data.objectives.as_deref())
        .bind(data.deliverables.is_some())
        .bind(data.deliverables.as_deref())
        .bind(data.resources_needed.is_some())
        .bind(data.resources_needed.as_deref())
        .bind(status)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, ProjectTimeline>(&format!(
            "SELECT {TIMELINE_COLUMNS} FROM project_timelines WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Phases of an idea, ordered by `phase_number`.
    pub async fn find_by_idea_id<'e, E>(executor: E, idea_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, ProjectTimeline>(&format!(
            r#"SELECT {TIMELINE_COLUMNS}
               FROM project_timelines
               WHERE idea_id = $1
               ORDER BY phase_number ASC, created_at ASC"#
        ))
        .bind(idea_id)
        .fetch_all(executor)
        .await
    }

    /// Apply a descriptive edit. Leaves `progress_percentage` and `phase_number` alone.
    pub async fn update<'e, E>(
        executor: E,
        idea_id: Uuid,
        data: &UpdateProjectTimeline,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, ProjectTimeline>(&format!(
            r#"UPDATE project_timelines
               SET phase_name       = COALESCE($3, phase_name),
                   start_date       = COALESCE($4, start_date),
                   end_date         = COALESCE($5, end_date),
                   objectives       = CASE WHEN $6 THEN $7 ELSE objectives END,
                   deliverables     = CASE WHEN $8 THEN $9 ELSE deliverables END,
                   resources_needed = CASE WHEN $10 THEN $11 ELSE resources_needed END,
                   status           = COALESCE($12, status),
                   updated_at       = $13
               WHERE id = $1 AND idea_id = $2
               RETURNING {TIMELINE_COLUMNS}"#
        ))
        .bind(data.id)
        .bind(idea_id)
        .bind(&data.phase_name)
        .bind(&data.start_date)
        .bind(&data.end_date)
        .bind(data.objectives.is_some())
        .bind(data.objectives.as_ref().and_then(Option::as_deref))
        .bind(data.deliverables.is_some())
        .bind(data.deliverables.as_ref().and_then(Option::as_deref))
        .bind(data.resources_needed.is_some())
        .bind(data.resources_needed.as_ref().and_then(Option::as_deref))
        .bind(data.status)
        .bind(Utc::now())
        .fetch_optional(executor)
        .await
    }

    /// Persist a recalculated progress value. Returns rows affected.
    pub async fn update_progress<'e, E>(
        executor: E,
        id: Uuid,
        progress_percentage: i32,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE project_timelines SET progress_percentage = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(progress_percentage)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Owned tasks go with the phase through the `ON DELETE CASCADE` key.
    pub async fn delete<'e, E>(executor: E, id: Uuid, idea_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM project_timelines WHERE id = $1 AND idea_id = $2")
            .bind(id)
            .bind(idea_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
