/// Project model and database operations
///
/// A project belongs to one client company, carries a set of team leaders
/// (only `team_leader`-role users; the route layer enforces the pairing)
/// and a set of departments, and owns tasks. The end date, when present,
/// must fall after the start date.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('planned', 'active', 'completed', 'on_hold');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description VARCHAR(1000),
///     client_id UUID NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
///     status project_status NOT NULL DEFAULT 'planned',
///     start_date TIMESTAMPTZ,
///     end_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_team_leaders (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (project_id, user_id)
/// );
///
/// CREATE TABLE project_departments (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     department_id UUID NOT NULL REFERENCES departments(id) ON DELETE CASCADE,
///     PRIMARY KEY (project_id, department_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planned,
    Active,
    Completed,
    OnHold,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub client_id: Uuid,
    pub status: ProjectStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project with joined names, member sets and task count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub client_id: Uuid,
    pub client_name: String,
    pub status: ProjectStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub team_leader_ids: Vec<Uuid>,
    pub team_leader_names: Vec<String>,
    pub department_ids: Vec<Uuid>,
    pub task_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub client_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Team leaders to attach (role validated by the caller)
    #[serde(default)]
    pub team_leader_ids: Vec<Uuid>,
    /// Departments to attach
    #[serde(default)]
    pub department_ids: Vec<Uuid>,
}

/// Input for updating a project
///
/// `team_leader_ids` / `department_ids`, when present, replace the whole
/// set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub client_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub team_leader_ids: Option<Vec<Uuid>>,
    pub department_ids: Option<Vec<Uuid>>,
}

const PROJECT_COLUMNS: &str =
    "id, name, description, client_id, status, start_date, end_date, created_at, updated_at";

const SUMMARY_QUERY: &str = r#"
    SELECT p.id, p.name, p.description, p.client_id, c.name AS client_name,
           p.status, p.start_date, p.end_date, p.created_at,
           COALESCE(tl.ids, ARRAY[]::uuid[]) AS team_leader_ids,
           COALESCE(tl.names, ARRAY[]::varchar[]) AS team_leader_names,
           COALESCE(pd.ids, ARRAY[]::uuid[]) AS department_ids,
           (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS task_count
    FROM projects p
    JOIN clients c ON c.id = p.client_id
    LEFT JOIN LATERAL (
        SELECT ARRAY_AGG(u.id) AS ids, ARRAY_AGG(u.full_name) AS names
        FROM project_team_leaders ptl
        JOIN users u ON u.id = ptl.user_id
        WHERE ptl.project_id = p.id
    ) tl ON TRUE
    LEFT JOIN LATERAL (
        SELECT ARRAY_AGG(pdep.department_id) AS ids
        FROM project_departments pdep
        WHERE pdep.project_id = p.id
    ) pd ON TRUE
"#;

impl Project {
    /// Creates a project with its team-leader and department sets in one
    /// transaction
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (name, description, client_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.client_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in &data.team_leader_ids {
            sqlx::query(
                "INSERT INTO project_team_leaders (project_id, user_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(project.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        for department_id in &data.department_ids {
            sqlx::query(
                "INSERT INTO project_departments (project_id, department_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(project.id)
            .bind(department_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a project summary by ID
    pub async fn find_summary(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ProjectSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProjectSummary>(&format!("{SUMMARY_QUERY} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists all project summaries
    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProjectSummary>(&format!("{SUMMARY_QUERY} ORDER BY p.created_at DESC"))
            .fetch_all(pool)
            .await
    }

    /// Lists project summaries for one client company
    ///
    /// This is the visibility filter applied to `client`-role users.
    pub async fn list_summaries_for_client(
        pool: &PgPool,
        client_id: Uuid,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProjectSummary>(&format!(
            "{SUMMARY_QUERY} WHERE p.client_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    /// Updates a project; member sets, when present, are replaced wholesale
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.client_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", client_id = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.end_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROJECT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(client_id) = data.client_id {
            q = q.bind(client_id);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            q = q.bind(end_date);
        }

        let project = match q.fetch_optional(&mut *tx).await? {
            Some(project) => project,
            None => return Ok(None),
        };

        if let Some(team_leader_ids) = data.team_leader_ids {
            sqlx::query("DELETE FROM project_team_leaders WHERE project_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for user_id in team_leader_ids {
                sqlx::query(
                    "INSERT INTO project_team_leaders (project_id, user_id) VALUES ($1, $2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        if let Some(department_ids) = data.department_ids {
            sqlx::query("DELETE FROM project_departments WHERE project_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for department_id in department_ids {
                sqlx::query(
                    "INSERT INTO project_departments (project_id, department_id) VALUES ($1, $2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(id)
                .bind(department_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Deletes a project (tasks and join rows cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks a project exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1)")
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
    fn test_status_as_str() {
        assert_eq!(ProjectStatus::Planned.as_str(), "planned");
        assert_eq!(ProjectStatus::Active.as_str(), "active");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
        assert_eq!(ProjectStatus::OnHold.as_str(), "on_hold");
    }

    #[test]
    fn test_update_project_default_is_empty() {
        let update = UpdateProject::default();
        assert!(update.name.is_none());
        assert!(update.status.is_none());
        assert!(update.team_leader_ids.is_none());
        assert!(update.department_ids.is_none());
    }
}
