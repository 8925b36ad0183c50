/// Department model and database operations
///
/// Departments group users and tasks. A department cannot be deleted while
/// users or tasks still reference it; callers get [`DepartmentInUse`] and
/// map it to a 409.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE departments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL UNIQUE,
///     description VARCHAR(500),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// [`DepartmentInUse`]: DeleteOutcome::InUse

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Department model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub id: Uuid,
    /// Unique department name
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Department with membership counts, for list views
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DepartmentSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub user_count: i64,
    pub task_count: i64,
}

/// Input for creating a department
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
    pub description: Option<String>,
}

/// Result of a guarded delete attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Row removed
    Deleted,
    /// No such department
    NotFound,
    /// Users or tasks still reference the department
    InUse,
}

impl Department {
    /// Creates a new department
    ///
    /// # Errors
    ///
    /// Unique-name violations surface as a database constraint error.
    pub async fn create(pool: &PgPool, data: CreateDepartment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    /// Finds a department by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            "SELECT id, name, description, created_at FROM departments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all departments with user and task counts
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<DepartmentSummary>, sqlx::Error> {
        sqlx::query_as::<_, DepartmentSummary>(
            r#"
            SELECT d.id, d.name, d.description,
                   (SELECT COUNT(*) FROM users u WHERE u.department_id = d.id) AS user_count,
                   (SELECT COUNT(*) FROM tasks t WHERE t.department_id = d.id) AS task_count
            FROM departments d
            ORDER BY d.name
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Updates name and description
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        name: String,
        description: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a department unless users or tasks still reference it
    pub async fn delete_guarded(pool: &PgPool, id: Uuid) -> Result<DeleteOutcome, sqlx::Error> {
        if !Self::exists(pool, id).await? {
            return Ok(DeleteOutcome::NotFound);
        }

        let (in_use,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE department_id = $1)
                OR EXISTS (SELECT 1 FROM tasks WHERE department_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        if in_use {
            return Ok(DeleteOutcome::InUse);
        }

        sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(DeleteOutcome::Deleted)
    }

    /// Checks a department exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM departments WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_outcome_equality() {
        assert_eq!(DeleteOutcome::Deleted, DeleteOutcome::Deleted);
        assert_ne!(DeleteOutcome::Deleted, DeleteOutcome::InUse);
        assert_ne!(DeleteOutcome::NotFound, DeleteOutcome::InUse);
    }
}
