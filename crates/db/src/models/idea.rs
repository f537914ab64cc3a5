use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;
use uuid::Uuid;

/// A startup idea. Owns its timeline phases; `user_id` decides who may edit them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Idea {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Idea {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub async fn create<'e, E>(executor: E, user_id: Uuid, title: &str) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Idea>(
            r#"INSERT INTO ideas (id, user_id, title, created_at)
               VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, title, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Idea>("SELECT id, user_id, title, created_at FROM ideas WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}
