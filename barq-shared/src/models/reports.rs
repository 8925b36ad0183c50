/// Read-only reporting aggregates
///
/// Each report is one aggregate query plus a little arithmetic; nothing
/// here mutates state. Per-user numbers are computed over the
/// `task_assignees` history table so completed work still counts after a
/// task's live assignee is cleared on approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Status breakdown shared by the report types
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskBreakdown {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub in_review: i64,
    pub sent_to_client: i64,
    pub done: i64,
    pub overdue: i64,
}

/// Project-scoped report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    pub project_id: Uuid,
    pub project_name: String,
    pub client_name: String,
    pub tasks: TaskBreakdown,
    pub completion_percentage: f64,
}

/// Per-user performance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPerformanceReport {
    pub user_id: Uuid,
    pub user_name: String,
    pub total_assigned: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub overdue: i64,
    pub completion_rate: f64,
    pub projects_worked_on: i64,
}

/// Department-scoped report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentReport {
    pub department_id: Uuid,
    pub department_name: String,
    pub user_count: i64,
    pub tasks: TaskBreakdown,
    pub completion_percentage: f64,
}

/// Whole-system overview
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SystemOverview {
    pub user_count: i64,
    pub client_count: i64,
    pub department_count: i64,
    pub project_count: i64,
    pub active_project_count: i64,
    pub task_count: i64,
    pub open_task_count: i64,
    pub overdue_task_count: i64,
    pub unread_notification_count: i64,
}

/// Optional reporting window applied to task creation dates
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Share of finished work, clamped to [0, 100]
pub fn completion_percentage(done: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (done as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

const BREAKDOWN_SELECT: &str = r#"
    SELECT COUNT(*) AS total,
           COUNT(*) FILTER (WHERE t.status = 'pending') AS pending,
           COUNT(*) FILTER (WHERE t.status = 'in_progress') AS in_progress,
           COUNT(*) FILTER (WHERE t.status = 'in_review') AS in_review,
           COUNT(*) FILTER (WHERE t.status = 'sent_to_client') AS sent_to_client,
           COUNT(*) FILTER (WHERE t.status = 'done') AS done,
           COUNT(*) FILTER (WHERE t.status <> 'done'
                            AND t.due_date IS NOT NULL
                            AND t.due_date < NOW()) AS overdue
    FROM tasks t
"#;

/// Builds a project report
pub async fn project_report(
    pool: &PgPool,
    project_id: Uuid,
    window: ReportWindow,
) -> Result<Option<ProjectReport>, sqlx::Error> {
    let header: Option<(String, String)> = sqlx::query_as(
        r#"
        SELECT p.name, c.name
        FROM projects p JOIN clients c ON c.id = p.client_id
        WHERE p.id = $1
        "#,
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?;

    let (project_name, client_name) = match header {
        Some(names) => names,
        None => return Ok(None),
    };

    let tasks = sqlx::query_as::<_, TaskBreakdown>(&format!(
        r#"{BREAKDOWN_SELECT}
        WHERE t.project_id = $1
          AND ($2::timestamptz IS NULL OR t.created_at >= $2)
          AND ($3::timestamptz IS NULL OR t.created_at <= $3)
        "#,
    ))
    .bind(project_id)
    .bind(window.from)
    .bind(window.to)
    .fetch_one(pool)
    .await?;

    let completion = completion_percentage(tasks.done, tasks.total);
    Ok(Some(ProjectReport {
        project_id,
        project_name,
        client_name,
        tasks,
        completion_percentage: completion,
    }))
}

/// Builds a per-user performance report over the assignment history
pub async fn user_performance_report(
    pool: &PgPool,
    user_id: Uuid,
    window: ReportWindow,
) -> Result<Option<UserPerformanceReport>, sqlx::Error> {
    let user_name: Option<(String,)> =
        sqlx::query_as("SELECT full_name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    let user_name = match user_name {
        Some((name,)) => name,
        None => return Ok(None),
    };

    let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE t.status = 'done') AS completed,
               COUNT(*) FILTER (WHERE t.status = 'in_progress') AS in_progress,
               COUNT(*) FILTER (WHERE t.status <> 'done'
                                AND t.due_date IS NOT NULL
                                AND t.due_date < NOW()) AS overdue,
               COUNT(DISTINCT t.project_id) AS projects
        FROM task_assignees ta
        JOIN tasks t ON t.id = ta.task_id
        WHERE ta.user_id = $1
          AND ($2::timestamptz IS NULL OR t.created_at >= $2)
          AND ($3::timestamptz IS NULL OR t.created_at <= $3)
        "#,
    )
    .bind(user_id)
    .bind(window.from)
    .bind(window.to)
    .fetch_one(pool)
    .await?;

    let (total, completed, in_progress, overdue, projects) = row;
    Ok(Some(UserPerformanceReport {
        user_id,
        user_name,
        total_assigned: total,
        completed,
        in_progress,
        overdue,
        completion_rate: completion_percentage(completed, total),
        projects_worked_on: projects,
    }))
}

/// Builds a department report
pub async fn department_report(
    pool: &PgPool,
    department_id: Uuid,
    window: ReportWindow,
) -> Result<Option<DepartmentReport>, sqlx::Error> {
    let header: Option<(String, i64)> = sqlx::query_as(
        r#"
        SELECT d.name,
               (SELECT COUNT(*) FROM users u WHERE u.department_id = d.id)
        FROM departments d
        WHERE d.id = $1
        "#,
    )
    .bind(department_id)
    .fetch_optional(pool)
    .await?;

    let (department_name, user_count) = match header {
        Some(row) => row,
        None => return Ok(None),
    };

    let tasks = sqlx::query_as::<_, TaskBreakdown>(&format!(
        r#"{BREAKDOWN_SELECT}
        WHERE t.department_id = $1
          AND ($2::timestamptz IS NULL OR t.created_at >= $2)
          AND ($3::timestamptz IS NULL OR t.created_at <= $3)
        "#,
    ))
    .bind(department_id)
    .bind(window.from)
    .bind(window.to)
    .fetch_one(pool)
    .await?;

    let completion = completion_percentage(tasks.done, tasks.total);
    Ok(Some(DepartmentReport {
        department_id,
        department_name,
        user_count,
        tasks,
        completion_percentage: completion,
    }))
}

/// Builds the system-wide overview
pub async fn system_overview(pool: &PgPool) -> Result<SystemOverview, sqlx::Error> {
    sqlx::query_as::<_, SystemOverview>(
        r#"
        SELECT (SELECT COUNT(*) FROM users) AS user_count,
               (SELECT COUNT(*) FROM clients) AS client_count,
               (SELECT COUNT(*) FROM departments) AS department_count,
               (SELECT COUNT(*) FROM projects) AS project_count,
               (SELECT COUNT(*) FROM projects WHERE status = 'active') AS active_project_count,
               (SELECT COUNT(*) FROM tasks) AS task_count,
               (SELECT COUNT(*) FROM tasks WHERE status <> 'done') AS open_task_count,
               (SELECT COUNT(*) FROM tasks WHERE status <> 'done'
                   AND due_date IS NOT NULL AND due_date < NOW()) AS overdue_task_count,
               (SELECT COUNT(*) FROM notifications WHERE NOT is_read) AS unread_notification_count
        "#,
    )
    .fetch_one(pool)
    .await
}

/// One row of cross-entity search results
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchHit {
    /// "task", "project", "user" or "client"
    pub kind: String,
    pub id: Uuid,
    pub title: String,
    pub snippet: Option<String>,
}

/// Searches tasks, projects, users and clients by substring
///
/// `kind` narrows the search to one entity type; each type is capped to
/// keep the response bounded.
pub async fn search(
    pool: &PgPool,
    query: &str,
    kind: Option<&str>,
    per_kind_limit: i64,
) -> Result<Vec<SearchHit>, sqlx::Error> {
    let pattern = format!("%{}%", query);
    let mut hits = Vec::new();

    if kind.is_none() || kind == Some("task") {
        let rows = sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT 'task' AS kind, id, title, description AS snippet
            FROM tasks
            WHERE title ILIKE $1 OR description ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(per_kind_limit)
        .fetch_all(pool)
        .await?;
        hits.extend(rows);
    }

    if kind.is_none() || kind == Some("project") {
        let rows = sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT 'project' AS kind, id, name AS title, description AS snippet
            FROM projects
            WHERE name ILIKE $1 OR description ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(per_kind_limit)
        .fetch_all(pool)
        .await?;
        hits.extend(rows);
    }

    if kind.is_none() || kind == Some("user") {
        let rows = sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT 'user' AS kind, id, full_name AS title, position AS snippet
            FROM users
            WHERE full_name ILIKE $1 OR username ILIKE $1 OR email ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(per_kind_limit)
        .fetch_all(pool)
        .await?;
        hits.extend(rows);
    }

    if kind.is_none() || kind == Some("client") {
        let rows = sqlx::query_as::<_, SearchHit>(
            r#"
            SELECT 'client' AS kind, id, name AS title, address AS snippet
            FROM clients
            WHERE name ILIKE $1 OR email ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(per_kind_limit)
        .fetch_all(pool)
        .await?;
        hits.extend(rows);
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(0, 10), 0.0);
        assert_eq!(completion_percentage(5, 10), 50.0);
        assert_eq!(completion_percentage(10, 10), 100.0);
        assert_eq!(completion_percentage(20, 10), 100.0);
        assert_eq!(completion_percentage(5, -1), 0.0);
    }
}
