/// Task comment model
///
/// Comments hang off tasks; review rejections append their notes here so
/// the feedback trail lives with the task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A single task comment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskComment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Comment row with the author's name joined in
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskCommentView {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl TaskComment {
    /// Adds a comment to a task
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<TaskCommentView, sqlx::Error> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            INSERT INTO task_comments (task_id, user_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, body, created_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(body)
        .fetch_one(pool)
        .await?;

        // Re-read with the author name for the response
        let view = sqlx::query_as::<_, TaskCommentView>(
            r#"
            SELECT c.id, c.task_id, c.user_id, u.full_name AS user_name, c.body, c.created_at
            FROM task_comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.id = $1
            "#,
        )
        .bind(comment.id)
        .fetch_one(pool)
        .await?;

        Ok(view)
    }

    /// Lists a task's comments oldest-first
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: Uuid,
    ) -> Result<Vec<TaskCommentView>, sqlx::Error> {
        sqlx::query_as::<_, TaskCommentView>(
            r#"
            SELECT c.id, c.task_id, c.user_id, u.full_name AS user_name, c.body, c.created_at
            FROM task_comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}
