/// Audit log model and queries
///
/// Append-only record of who did what to which entity. Rows are written
/// alongside mutations (task history, deadline extensions, reviews) and
/// are never updated or deleted through the API.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE audit_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     entity_type VARCHAR(50) NOT NULL,
///     entity_id UUID,
///     action VARCHAR(200) NOT NULL,
///     detail VARCHAR(1000),
///     user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Audit log row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    /// Entity kind, e.g. "task", "project", "user"
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    /// Short action phrase, e.g. "created", "deadline extended"
    pub action: String,
    /// Free-form context (old/new values, reasons)
    pub detail: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Audit row with the actor's name joined in
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogView {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub action: String,
    pub detail: Option<String>,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filters for audit queries
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Aggregate audit counts
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditStats {
    pub total: i64,
    pub today: i64,
    pub this_week: i64,
}

impl AuditLog {
    /// Appends an audit entry
    ///
    /// Failures are the caller's to decide on; workflow endpoints log and
    /// continue rather than failing the main operation.
    pub async fn record(
        pool: &PgPool,
        entity_type: &str,
        entity_id: Uuid,
        action: &str,
        detail: Option<&str>,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (entity_type, entity_id, action, detail, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, entity_type, entity_id, action, detail, user_id, created_at
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(action)
        .bind(detail)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Lists audit entries under optional filters, newest-first
    pub async fn list(
        pool: &PgPool,
        filter: AuditFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogView>, sqlx::Error> {
        sqlx::query_as::<_, AuditLogView>(
            r#"
            SELECT a.id, a.entity_type, a.entity_id, a.action, a.detail,
                   a.user_id, u.full_name AS user_name, a.created_at
            FROM audit_logs a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE ($1::varchar IS NULL OR a.entity_type = $1)
              AND ($2::uuid IS NULL OR a.entity_id = $2)
              AND ($3::uuid IS NULL OR a.user_id = $3)
            ORDER BY a.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.entity_type)
        .bind(filter.entity_id)
        .bind(filter.user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Lists the audit trail of one entity (task history view)
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<AuditLogView>, sqlx::Error> {
        Self::list(
            pool,
            AuditFilter {
                entity_type: Some(entity_type.to_string()),
                entity_id: Some(entity_id),
                user_id: None,
            },
            200,
            0,
        )
        .await
    }

    /// Aggregate counts for the audit dashboard
    pub async fn stats(pool: &PgPool) -> Result<AuditStats, sqlx::Error> {
        sqlx::query_as::<_, AuditStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE created_at >= date_trunc('day', NOW())) AS today,
                   COUNT(*) FILTER (WHERE created_at >= date_trunc('week', NOW())) AS this_week
            FROM audit_logs
            "#,
        )
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_default_is_unfiltered() {
        let filter = AuditFilter::default();
        assert!(filter.entity_type.is_none());
        assert!(filter.entity_id.is_none());
        assert!(filter.user_id.is_none());
    }
}
