/// Notification model and database operations
///
/// Per-user in-app messages with a read flag, optionally linked to a task
/// or project. Workflow transitions, delegation, and the worker's overdue
/// scan all write rows here; delivery beyond the database (push, email)
/// is outside this service.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     message VARCHAR(1000) NOT NULL,
///     is_read BOOLEAN NOT NULL DEFAULT FALSE,
///     task_id UUID REFERENCES tasks(id) ON DELETE CASCADE,
///     project_id UUID REFERENCES projects(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Notification row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Notification with linked task/project titles joined in
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub task_id: Option<Uuid>,
    pub task_title: Option<String>,
    pub project_id: Option<Uuid>,
    pub project_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

const VIEW_QUERY: &str = r#"
    SELECT n.id, n.user_id, n.message, n.is_read,
           n.task_id, t.title AS task_title,
           n.project_id, p.name AS project_name,
           n.created_at
    FROM notifications n
    LEFT JOIN tasks t ON t.id = n.task_id
    LEFT JOIN projects p ON p.id = n.project_id
"#;

impl Notification {
    /// Creates a notification for one user
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        message: &str,
        task_id: Option<Uuid>,
        project_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message, task_id, project_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, message, is_read, task_id, project_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .bind(task_id)
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    /// Lists a user's notifications newest-first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<NotificationView>, sqlx::Error> {
        let filter = if unread_only {
            " WHERE n.user_id = $1 AND NOT n.is_read"
        } else {
            " WHERE n.user_id = $1"
        };
        sqlx::query_as::<_, NotificationView>(&format!(
            "{VIEW_QUERY}{filter} ORDER BY n.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Counts a user's unread notifications
    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Marks one notification read; scoped to the owner
    pub async fn mark_read(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks all of a user's notifications read; returns how many changed
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a notification; scoped to the owner
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether an overdue notice already went out today for a task/user
    ///
    /// The worker's overdue scan runs hourly; this keeps it to one nag per
    /// day per task per recipient.
    pub async fn overdue_notice_sent_today(
        pool: &PgPool,
        user_id: Uuid,
        task_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1 AND task_id = $2
                  AND message LIKE '%overdue%'
                  AND created_at >= date_trunc('day', NOW())
            )
            "#,
        )
        .bind(user_id)
        .bind(task_id)
        .fetch_one(pool)
        .await?;

        Ok(found)
    }
}
