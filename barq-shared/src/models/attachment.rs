/// Task attachment metadata
///
/// Only the metadata row is stored here; the bytes live wherever
/// `file_url` points. Upload/download streaming is outside this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Attachment metadata row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

/// Attachment row with the uploader's name joined in
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttachmentView {
    pub id: Uuid,
    pub task_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_by_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl Attachment {
    /// Records an attachment against a task
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        uploaded_by: Uuid,
        file_name: String,
        file_url: String,
    ) -> Result<AttachmentView, sqlx::Error> {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (task_id, file_name, file_url, uploaded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, task_id, file_name, file_url, uploaded_by, uploaded_at
            "#,
        )
        .bind(task_id)
        .bind(file_name)
        .bind(file_url)
        .bind(uploaded_by)
        .fetch_one(pool)
        .await?;

        let view = sqlx::query_as::<_, AttachmentView>(
            r#"
            SELECT a.id, a.task_id, a.file_name, a.file_url,
                   a.uploaded_by, u.full_name AS uploaded_by_name, a.uploaded_at
            FROM attachments a
            LEFT JOIN users u ON u.id = a.uploaded_by
            WHERE a.id = $1
            "#,
        )
        .bind(attachment.id)
        .fetch_one(pool)
        .await?;

        Ok(view)
    }

    /// Lists a task's attachments newest-first
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: Uuid,
    ) -> Result<Vec<AttachmentView>, sqlx::Error> {
        sqlx::query_as::<_, AttachmentView>(
            r#"
            SELECT a.id, a.task_id, a.file_name, a.file_url,
                   a.uploaded_by, u.full_name AS uploaded_by_name, a.uploaded_at
            FROM attachments a
            LEFT JOIN users u ON u.id = a.uploaded_by
            WHERE a.task_id = $1
            ORDER BY a.uploaded_at DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}
