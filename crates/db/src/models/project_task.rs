use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Canonical task status. Covers both planner vocabularies
/// (`pending/in_progress/completed` and `planned/upcoming/in_progress/completed`).
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Planned,
    Upcoming,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Completion percentage a status change suggests in the UI.
    ///
    /// Only clients apply this, and only when the user changes status; stored
    /// `completion_percentage` values are never rewritten from it.
    pub fn suggested_completion(self) -> i32 {
        match self {
            TaskStatus::Pending | TaskStatus::Planned => 0,
            TaskStatus::Upcoming => 25,
            TaskStatus::InProgress => 50,
            TaskStatus::Completed => 100,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A unit of work inside a timeline phase (`project_tasks`).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ProjectTask {
    pub id: Uuid,
    pub timeline_id: Uuid, // Foreign key to ProjectTimeline
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub completion_percentage: i32,   // How complete this task is
    pub contribution_percentage: i32, // Weight toward the phase's progress
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateProjectTask {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub completion_percentage: Option<i32>,
    pub contribution_percentage: Option<i32>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

impl CreateProjectTask {
    pub fn from_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn weighted(title: impl Into<String>, contribution: i32, completion: i32) -> Self {
        Self {
            title: title.into(),
            completion_percentage: Some(completion),
            contribution_percentage: Some(contribution),
            ..Default::default()
        }
    }
}

/// Partial task edit. `None` leaves the column unchanged. On the nullable columns
/// `Some(None)` (an explicit JSON `null`) clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProjectTask {
    pub id: Uuid,
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[ts(optional)]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub completion_percentage: Option<i32>,
    pub contribution_percentage: Option<i32>,
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[ts(optional)]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    #[ts(optional)]
    pub assigned_to: Option<Option<Uuid>>,
}

impl UpdateProjectTask {
    /// The planner's "move to status" edit: status plus its suggested completion.
    pub fn status_change(id: Uuid, status: TaskStatus) -> Self {
        Self {
            id,
            status: Some(status),
            completion_percentage: Some(status.suggested_completion()),
            ..Default::default()
        }
    }
}

const TASK_COLUMNS: &str = "id, timeline_id, title, description, status, completion_percentage, contribution_percentage, priority, due_date, assigned_to, created_at, updated_at";

impl ProjectTask {
    /// Tasks of a phase in creation order.
    pub async fn find_by_timeline_id<'e, E>(
        executor: E,
        timeline_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, ProjectTask>(&format!(
            r#"SELECT {TASK_COLUMNS}
               FROM project_tasks
               WHERE timeline_id = $1
               ORDER BY created_at ASC, rowid ASC"#
        ))
        .bind(timeline_id)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, ProjectTask>(&format!(
            "SELECT {TASK_COLUMNS} FROM project_tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        timeline_id: Uuid,
        data: &CreateProjectTask,
        task_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let status = data.status.unwrap_or_default();
        let priority = data.priority.unwrap_or_default();
        let now = Utc::now();
        sqlx::query_as::<_, ProjectTask>(&format!(
            r#"INSERT INTO project_tasks
                   (id, timeline_id, title, description, status, completion_percentage, contribution_percentage, priority, due_date, assigned_to, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(task_id)
        .bind(timeline_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(status)
        .bind(data.completion_percentage.unwrap_or(0))
        .bind(data.contribution_percentage.unwrap_or(0))
        .bind(priority)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    /// Returns `None` when no task with that id lives in `timeline_id`.
    pub async fn update<'e, E>(
        executor: E,
        timeline_id: Uuid,
        data: &UpdateProjectTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, ProjectTask>(&format!(
            r#"UPDATE project_tasks
               SET title                   = COALESCE($3, title),
                   description             = CASE WHEN $4 THEN $5 ELSE description END,
                   status                  = COALESCE($6, status),
                   completion_percentage   = COALESCE($7, completion_percentage),
                   contribution_percentage = COALESCE($8, contribution_percentage),
                   priority                = COALESCE($9, priority),
                   due_date                = CASE WHEN $10 THEN $11 ELSE due_date END,
                   assigned_to             = CASE WHEN $12 THEN $13 ELSE assigned_to END,
                   updated_at              = $14
               WHERE id = $1 AND timeline_id = $2
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(data.id)
        .bind(timeline_id)
        .bind(&data.title)
        .bind(data.description.is_some())
        .bind(data.description.as_ref().and_then(Option::as_deref))
        .bind(data.status)
        .bind(data.completion_percentage)
        .bind(data.contribution_percentage)
        .bind(data.priority)
        .bind(data.due_date.is_some())
        .bind(data.due_date.flatten())
        .bind(data.assigned_to.is_some())
        .bind(data.assigned_to.flatten())
        .bind(Utc::now())
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid, timeline_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM project_tasks WHERE id = $1 AND timeline_id = $2")
            .bind(id)
            .bind(timeline_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::{
            idea::Idea,
            project_timeline::{CreateProjectTimeline, PhaseStatus, ProjectTimeline},
        },
    };

    async fn setup_phase() -> (DBService, ProjectTimeline) {
        let db = DBService::new_in_memory().await.unwrap();
        let idea = Idea::create(&db.pool, Uuid::new_v4(), "Seed idea").await.unwrap();
        let phase = ProjectTimeline::create(
            &db.pool,
            Uuid::new_v4(),
            idea.id,
            PhaseStatus::Pending,
            &CreateProjectTimeline {
                phase_name: "Discovery".to_string(),
                start_date: "2025-01-01".to_string(),
                end_date: "2025-02-01".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (db, phase)
    }

    #[test]
    fn test_suggested_completion_table() {
        assert_eq!(TaskStatus::Planned.suggested_completion(), 0);
        assert_eq!(TaskStatus::Pending.suggested_completion(), 0);
        assert_eq!(TaskStatus::Upcoming.suggested_completion(), 25);
        assert_eq!(TaskStatus::InProgress.suggested_completion(), 50);
        assert_eq!(TaskStatus::Completed.suggested_completion(), 100);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            serde_json::json!("in_progress")
        );
        assert_eq!("upcoming".parse::<TaskStatus>().unwrap(), TaskStatus::Upcoming);
        assert_eq!(TaskPriority::Urgent.to_string(), "urgent");
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let (db, phase) = setup_phase().await;
        let task = ProjectTask::create(
            &db.pool,
            phase.id,
            &CreateProjectTask::from_title("Interview customers"),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.completion_percentage, 0);
        assert_eq!(task.contribution_percentage, 0);
        assert!(task.due_date.is_none());
    }

    #[tokio::test]
    async fn test_find_by_timeline_keeps_creation_order() {
        let (db, phase) = setup_phase().await;
        for title in ["first", "second", "third"] {
            ProjectTask::create(
                &db.pool,
                phase.id,
                &CreateProjectTask::from_title(title),
                Uuid::new_v4(),
            )
            .await
            .unwrap();
        }

        let titles: Vec<String> = ProjectTask::find_by_timeline_id(&db.pool, phase.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_update_is_partial_and_scoped_to_timeline() {
        let (db, phase) = setup_phase().await;
        let task = ProjectTask::create(
            &db.pool,
            phase.id,
            &CreateProjectTask::weighted("Build MVP", 40, 10),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let updated = ProjectTask::update(
            &db.pool,
            phase.id,
            &UpdateProjectTask::status_change(task.id, TaskStatus::InProgress),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.completion_percentage, 50);
        assert_eq!(updated.contribution_percentage, 40);
        assert_eq!(updated.title, "Build MVP");

        let other_phase = Uuid::new_v4();
        let missing = ProjectTask::update(
            &db.pool,
            other_phase,
            &UpdateProjectTask {
                id: task.id,
                title: Some("nope".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_deleting_phase_cascades_to_tasks() {
        let (db, phase) = setup_phase().await;
        let task = ProjectTask::create(
            &db.pool,
            phase.id,
            &CreateProjectTask::from_title("Landing page"),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let removed = ProjectTimeline::delete(&db.pool, phase.id, phase.idea_id)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(ProjectTask::find_by_id(&db.pool, task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_null_clears_and_absent_keeps() {
        let (db, phase) = setup_phase().await;
        let owner = Uuid::new_v4();
        let task = ProjectTask::create(
            &db.pool,
            phase.id,
            &CreateProjectTask {
                title: "Pitch deck".to_string(),
                description: Some("ten slides".to_string()),
                due_date: NaiveDate::from_ymd_opt(2025, 2, 14),
                assigned_to: Some(owner),
                ..Default::default()
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        // Absent fields are left alone.
        let kept: UpdateProjectTask =
            serde_json::from_value(serde_json::json!({ "id": task.id, "title": "Deck" })).unwrap();
        let updated = ProjectTask::update(&db.pool, phase.id, &kept).await.unwrap().unwrap();
        assert_eq!(updated.description.as_deref(), Some("ten slides"));
        assert_eq!(updated.assigned_to, Some(owner));
        assert!(updated.due_date.is_some());

        let cleared: UpdateProjectTask = serde_json::from_value(serde_json::json!({
            "id": task.id,
            "description": null,
            "due_date": null,
            "assigned_to": null
        }))
        .unwrap();
        assert_eq!(cleared.due_date, Some(None));
        let updated = ProjectTask::update(&db.pool, phase.id, &cleared).await.unwrap().unwrap();
        assert_eq!(updated.title, "Deck");
        assert!(updated.description.is_none());
        assert!(updated.due_date.is_none());
        assert!(updated.assigned_to.is_none());
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(UpdateProjectTask {
            id,
            assigned_to: Some(None),
            ..Default::default()
        })
        .unwrap();
        assert!(value.get("due_date").is_none());
        assert_eq!(value["assigned_to"], serde_json::Value::Null);
        assert!(value.as_object().unwrap().contains_key("assigned_to"));
    }
}
