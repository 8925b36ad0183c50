/// Login attempt records
///
/// Every login attempt is recorded, success or failure. The failed-attempt
/// count within a window drives account lockout (see `auth::reset`).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One recorded login attempt
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoginAttempt {
    pub id: Uuid,
    pub username: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

impl LoginAttempt {
    /// Records an attempt
    pub async fn record(
        pool: &PgPool,
        username: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        succeeded: bool,
        failure_reason: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, LoginAttempt>(
            r#"
            INSERT INTO login_attempts (username, ip_address, user_agent, succeeded, failure_reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, ip_address, user_agent, succeeded, failure_reason, attempted_at
            "#,
        )
        .bind(username)
        .bind(ip_address)
        .bind(user_agent)
        .bind(succeeded)
        .bind(failure_reason)
        .fetch_one(pool)
        .await
    }

    /// Counts failed attempts for a username within the trailing window
    pub async fn failed_count_since(
        pool: &PgPool,
        username: &str,
        window: Duration,
    ) -> Result<i64, sqlx::Error> {
        let cutoff = Utc::now() - window;
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM login_attempts
            WHERE username = $1 AND NOT succeeded AND attempted_at > $2
            "#,
        )
        .bind(username)
        .bind(cutoff)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
