/// Task model, status machine and database operations
///
/// Tasks are the core entity of Barq. A task belongs to a project and a
/// department, is optionally assigned to one user, and moves through a
/// review workflow that ends with internal sign-off or client approval.
///
/// # State Machine
///
/// ```text
/// pending ────► in_progress ────► in_review ──► done            (approved internally)
///    │               ▲                │
///    │               │                └───────► sent_to_client
///    │               │                               │
///    │               ├── (review rejected) ◄─────────┤ (client rejected)
///    └───────────────┘                               └─────────► done (client approved)
/// ```
///
/// Rejection is not a state of its own: a rejected task returns to
/// `in_progress` with the reviewer's notes attached as a comment.
/// Transition legality is enforced centrally by
/// [`TaskStatus::can_transition_to`]; every workflow endpoint goes through
/// a guarded `UPDATE ... WHERE status = $from` so a stale caller loses the
/// race instead of clobbering state.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM (
///     'pending', 'in_progress', 'in_review', 'sent_to_client', 'done'
/// );
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'critical');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     department_id UUID NOT NULL REFERENCES departments(id),
///     title VARCHAR(200) NOT NULL,
///     description VARCHAR(2000),
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     delegated_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     original_assigner_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     drive_folder_link VARCHAR(500),
///     material_folder_link VARCHAR(500),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// -- Assignment history; one row per user ever assigned to the task.
/// -- Reports read this so completed work still counts after approval
/// -- clears the live assignee.
/// CREATE TABLE task_assignees (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, work not started
    Pending,

    /// Being worked on by the assignee
    InProgress,

    /// Assignee requested completion; awaiting reviewer decision
    InReview,

    /// Approved internally and forwarded for client approval
    SentToClient,

    /// Finished (internal sign-off or client approval)
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::InReview => "in_review",
            TaskStatus::SentToClient => "sent_to_client",
            TaskStatus::Done => "done",
        }
    }

    /// Terminal tasks accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Open tasks count against overdue checks and assignee workloads
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// Checks whether moving to `target` is a legal workflow step
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            // Starting work, or submitting straight from pending
            (TaskStatus::Pending, TaskStatus::InProgress) => true,
            (TaskStatus::Pending, TaskStatus::InReview) => true,

            // Assignee submits for review
            (TaskStatus::InProgress, TaskStatus::InReview) => true,

            // Reviewer decision: approve, forward to client, or reject
            (TaskStatus::InReview, TaskStatus::Done) => true,
            (TaskStatus::InReview, TaskStatus::SentToClient) => true,
            (TaskStatus::InReview, TaskStatus::InProgress) => true,

            // Client decision: approve or reject
            (TaskStatus::SentToClient, TaskStatus::Done) => true,
            (TaskStatus::SentToClient, TaskStatus::InProgress) => true,

            // Done is terminal
            _ => false,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        }
    }
}

/// Visibility scope applied to task listings
///
/// Derived from the caller's role by `auth::authorization::task_scope`:
/// employees see their own tasks, team leaders their department, clients
/// their company's projects, management everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// No filter (manager, assistant manager, account manager)
    All,
    /// Tasks assigned to this user
    AssignedTo(Uuid),
    /// Tasks in this department
    Department(Uuid),
    /// Tasks in projects owned by this client company
    Client(Uuid),
    /// Nothing visible (e.g. a client-role user with no company linked)
    Nothing,
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub department_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    /// Creator (nulled if the user is deleted)
    pub created_by: Option<Uuid>,
    /// Who last passed the task along
    pub delegated_by: Option<Uuid>,
    /// First assigner in the delegation chain, set once
    pub original_assigner_id: Option<Uuid>,
    pub drive_folder_link: Option<String>,
    pub material_folder_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task list row with joined names and counts
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskSummary {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_name: Option<String>,
    pub project_id: Uuid,
    pub project_name: String,
    pub department_id: Uuid,
    pub department_name: String,
    pub comment_count: i64,
    pub attachment_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub department_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub drive_folder_link: Option<String>,
    pub material_folder_link: Option<String>,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for updating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub assigned_to: Option<Option<Uuid>>,
    pub project_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub drive_folder_link: Option<Option<String>>,
    pub material_folder_link: Option<Option<String>>,
}

const TASK_COLUMNS: &str = "id, project_id, department_id, title, description, status, priority, \
     due_date, assigned_to, created_by, delegated_by, original_assigner_id, \
     drive_folder_link, material_folder_link, created_at, updated_at";

const SUMMARY_QUERY: &str = r#"
    SELECT t.id, t.title, t.status, t.priority, t.due_date,
           t.assigned_to, au.full_name AS assigned_to_name,
           t.project_id, p.name AS project_name,
           t.department_id, d.name AS department_name,
           (SELECT COUNT(*) FROM task_comments tc WHERE tc.task_id = t.id) AS comment_count,
           (SELECT COUNT(*) FROM attachments a WHERE a.task_id = t.id) AS attachment_count,
           t.created_at
    FROM tasks t
    JOIN projects p ON p.id = t.project_id
    JOIN departments d ON d.id = t.department_id
    LEFT JOIN users au ON au.id = t.assigned_to
"#;

/// Checks a due date falls inside the project window
///
/// Missing window edges are unbounded; a task in a project with no dates
/// can be due whenever.
pub fn due_date_in_window(
    due: DateTime<Utc>,
    project_start: Option<DateTime<Utc>>,
    project_end: Option<DateTime<Utc>>,
) -> bool {
    if let Some(start) = project_start {
        if due < start {
            return false;
        }
    }
    if let Some(end) = project_end {
        if due > end {
            return false;
        }
    }
    true
}

impl Task {
    /// Creates a task in `pending` status
    ///
    /// Foreign keys (project, department, assignee) must be validated by
    /// the caller so violations come back as friendly 400s rather than
    /// constraint errors.
    pub async fn create(
        pool: &PgPool,
        data: CreateTask,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (project_id, department_id, title, description, priority,
                               due_date, assigned_to, created_by,
                               drive_folder_link, material_folder_link)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.project_id)
        .bind(data.department_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .bind(created_by)
        .bind(data.drive_folder_link)
        .bind(data.material_folder_link)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(assignee) = task.assigned_to {
            sqlx::query(
                "INSERT INTO task_assignees (task_id, user_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(task.id)
            .bind(assignee)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(task)
    }

    /// Adds a user to the task's assignment history
    ///
    /// Called whenever `assigned_to` changes to someone new; history rows
    /// are never removed.
    pub async fn record_assignment(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO task_assignees (task_id, user_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists task summaries under a visibility scope
    pub async fn list(pool: &PgPool, scope: TaskScope) -> Result<Vec<TaskSummary>, sqlx::Error> {
        match scope {
            TaskScope::All => {
                sqlx::query_as::<_, TaskSummary>(&format!(
                    "{SUMMARY_QUERY} ORDER BY t.created_at DESC"
                ))
                .fetch_all(pool)
                .await
            }
            TaskScope::AssignedTo(user_id) => {
                sqlx::query_as::<_, TaskSummary>(&format!(
                    "{SUMMARY_QUERY} WHERE t.assigned_to = $1 ORDER BY t.created_at DESC"
                ))
                .bind(user_id)
                .fetch_all(pool)
                .await
            }
            TaskScope::Department(department_id) => {
                sqlx::query_as::<_, TaskSummary>(&format!(
                    "{SUMMARY_QUERY} WHERE t.department_id = $1 ORDER BY t.created_at DESC"
                ))
                .bind(department_id)
                .fetch_all(pool)
                .await
            }
            TaskScope::Client(client_id) => {
                sqlx::query_as::<_, TaskSummary>(&format!(
                    "{SUMMARY_QUERY} WHERE p.client_id = $1 ORDER BY t.created_at DESC"
                ))
                .bind(client_id)
                .fetch_all(pool)
                .await
            }
            TaskScope::Nothing => Ok(Vec::new()),
        }
    }

    /// Finds one task summary
    pub async fn find_summary(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskSummary>, sqlx::Error> {
        sqlx::query_as::<_, TaskSummary>(&format!("{SUMMARY_QUERY} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Updates task fields; status is owned by the workflow endpoints
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.project_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", project_id = ${}", bind_count));
        }
        if data.department_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", department_id = ${}", bind_count));
        }
        if data.drive_folder_link.is_some() {
            bind_count += 1;
            query.push_str(&format!(", drive_folder_link = ${}", bind_count));
        }
        if data.material_folder_link.is_some() {
            bind_count += 1;
            query.push_str(&format!(", material_folder_link = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(project_id) = data.project_id {
            q = q.bind(project_id);
        }
        if let Some(department_id) = data.department_id {
            q = q.bind(department_id);
        }
        if let Some(drive_folder_link) = data.drive_folder_link {
            q = q.bind(drive_folder_link);
        }
        if let Some(material_folder_link) = data.material_folder_link {
            q = q.bind(material_folder_link);
        }

        q.fetch_optional(pool).await
    }

    /// Performs a guarded status transition
    ///
    /// The row is only touched if it is still in `from`; a concurrent
    /// transition makes this return None and the caller reports a
    /// conflict. Approving into `done` clears the assignee so the task
    /// drops off the employee's list.
    pub async fn transition(
        pool: &PgPool,
        id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let clear_assignee = to == TaskStatus::Done;
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = $3,
                assigned_to = CASE WHEN $4 THEN NULL ELSE assigned_to END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(clear_assignee)
        .fetch_optional(pool)
        .await
    }

    /// Passes (delegates) the task to another user
    ///
    /// Records who passed it; the original assigner is remembered from the
    /// first pass onward.
    pub async fn pass_to(
        pool: &PgPool,
        id: Uuid,
        new_assignee: Uuid,
        passed_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET assigned_to = $2,
                delegated_by = $3,
                original_assigner_id = COALESCE(original_assigner_id, created_by),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(new_assignee)
        .bind(passed_by)
        .fetch_optional(&mut *tx)
        .await?;

        if task.is_some() {
            sqlx::query(
                "INSERT INTO task_assignees (task_id, user_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(new_assignee)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(task)
    }

    /// Moves the due date forward (deadline extension)
    pub async fn extend_deadline(
        pool: &PgPool,
        id: Uuid,
        new_due_date: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET due_date = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(new_due_date)
        .fetch_optional(pool)
        .await
    }

    /// Updates the due date as part of a review rejection
    pub async fn set_due_date(
        pool: &PgPool,
        id: Uuid,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET due_date = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(due_date)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a task (comments and attachments cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks a task exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM tasks WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(found)
    }

    /// Lists open tasks whose due date has passed
    ///
    /// Used by the worker's overdue scan.
    pub async fn list_overdue(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE due_date IS NOT NULL AND due_date < NOW() AND status <> 'done'
            ORDER BY due_date ASC
            "#,
        ))
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::InReview.as_str(), "in_review");
        assert_eq!(TaskStatus::SentToClient.as_str(), "sent_to_client");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_status_terminal() {
        assert!(TaskStatus::Done.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InReview.is_terminal());
        assert!(!TaskStatus::SentToClient.is_terminal());

        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Done.is_open());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InReview));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::InReview));
        assert!(TaskStatus::InReview.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::InReview.can_transition_to(TaskStatus::SentToClient));
        assert!(TaskStatus::SentToClient.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn test_rejection_routes_back_to_in_progress() {
        assert!(TaskStatus::InReview.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::SentToClient.can_transition_to(TaskStatus::InProgress));
    }

    #[test]
    fn test_illegal_transitions() {
        // Done is terminal
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::InReview));

        // No skipping review
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Done));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Done));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::SentToClient));

        // No moving backwards to pending
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::InReview.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn test_no_self_transitions() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::InReview,
            TaskStatus::SentToClient,
            TaskStatus::Done,
        ] {
            assert!(!status.can_transition_to(status), "{:?}", status);
        }
    }

    #[test]
    fn test_due_date_in_window() {
        let start = at(2025, 1, 1);
        let end = at(2025, 3, 1);

        assert!(due_date_in_window(at(2025, 2, 1), Some(start), Some(end)));
        assert!(due_date_in_window(start, Some(start), Some(end)));
        assert!(due_date_in_window(end, Some(start), Some(end)));
        assert!(!due_date_in_window(at(2024, 12, 31), Some(start), Some(end)));
        assert!(!due_date_in_window(at(2025, 3, 2), Some(start), Some(end)));

        // Missing edges are unbounded
        assert!(due_date_in_window(at(1990, 1, 1), None, Some(end)));
        assert!(due_date_in_window(at(2099, 1, 1), Some(start), None));
        assert!(due_date_in_window(at(2099, 1, 1), None, None));
    }

    #[test]
    fn test_default_priority() {
        assert_eq!(default_priority(), TaskPriority::Medium);
    }
}
