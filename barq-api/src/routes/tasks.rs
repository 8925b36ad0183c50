/// Task endpoints: CRUD plus the review workflow
///
/// # Endpoints
///
/// - `GET    /v1/tasks` - list under the caller's visibility scope
/// - `GET    /v1/tasks/:id`
/// - `POST   /v1/tasks` - create
/// - `PUT    /v1/tasks/:id` - update fields
/// - `DELETE /v1/tasks/:id`
/// - `PUT    /v1/tasks/:id/status` - plain status transition
/// - `GET/POST /v1/tasks/:id/comments`
/// - `GET/POST /v1/tasks/:id/attachments`
/// - `GET    /v1/tasks/:id/history` - audit trail
/// - `POST   /v1/tasks/:id/request-completion` - assignee submits for review
/// - `POST   /v1/tasks/:id/review` - reviewer approves/forwards/rejects
/// - `POST   /v1/tasks/:id/client-review` - client approves/rejects
/// - `POST   /v1/tasks/:id/pass` - delegate to another user
/// - `POST   /v1/tasks/:id/extend-deadline`
///
/// Transition legality lives in `TaskStatus::can_transition_to`; every
/// workflow endpoint revalidates it and performs a guarded update, so
/// two racing reviewers cannot both win. Audit rows and notifications
/// are written on every mutation; their failures are logged, never
/// allowed to fail the operation that already happened.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use barq_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        attachment::{Attachment, AttachmentView},
        audit::{AuditLog, AuditLogView},
        comment::{TaskComment, TaskCommentView},
        department::Department,
        notification::Notification,
        project::Project,
        task::{
            due_date_in_window, CreateTask, Task, TaskPriority, TaskScope, TaskStatus,
            TaskSummary, UpdateTask,
        },
        user::{User, UserRole},
    },
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub project_id: Uuid,
    pub department_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub drive_folder_link: Option<String>,
    pub material_folder_link: Option<String>,
}

/// Update task request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<Option<String>>,

    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub assigned_to: Option<Option<Uuid>>,
    pub project_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub drive_folder_link: Option<Option<String>>,
    pub material_folder_link: Option<Option<String>>,
}

/// Plain status transition request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

/// Comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub body: String,
}

/// Attachment request (metadata only; bytes live elsewhere)
#[derive(Debug, Deserialize, Validate)]
pub struct AttachmentRequest {
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub file_name: String,

    #[validate(length(min = 1, max = 500, message = "File URL must be 1-500 characters"))]
    pub file_url: String,
}

/// Reviewer decision
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub approve: bool,

    /// Required when rejecting; appended to the task as a comment
    pub notes: Option<String>,

    /// On rejection, optionally move the due date
    pub new_due_date: Option<DateTime<Utc>>,

    /// On approval, forward for client sign-off instead of closing
    #[serde(default)]
    pub forward_to_client: bool,
}

/// Client decision
#[derive(Debug, Deserialize)]
pub struct ClientReviewRequest {
    pub approve: bool,

    /// Required when rejecting
    pub notes: Option<String>,
}

/// Delegation request
#[derive(Debug, Deserialize)]
pub struct PassTaskRequest {
    pub assignee_id: Uuid,
}

/// Deadline extension request
#[derive(Debug, Deserialize, Validate)]
pub struct ExtendDeadlineRequest {
    pub new_due_date: DateTime<Utc>,

    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

/// Appends an audit row; failures are logged, not propagated
async fn record_audit(state: &AppState, task_id: Uuid, actor: Uuid, action: &str, detail: Option<&str>) {
    if let Err(e) = AuditLog::record(&state.db, "task", task_id, action, detail, actor).await {
        tracing::warn!(task_id = %task_id, "Failed to write audit entry: {}", e);
    }
}

/// Creates a notification; failures are logged, not propagated
async fn notify(state: &AppState, user_id: Uuid, message: &str, task: &Task) {
    if let Err(e) =
        Notification::create(&state.db, user_id, message, Some(task.id), Some(task.project_id))
            .await
    {
        tracing::warn!(user_id = %user_id, "Failed to create notification: {}", e);
    }
}

/// Checks the caller may see a given task under their scope
async fn check_task_visible(state: &AppState, auth: &AuthContext, task: &Task) -> ApiResult<()> {
    let scope = authorization::task_scope(&state.db, auth).await?;
    let visible = match scope {
        TaskScope::All => true,
        TaskScope::AssignedTo(user_id) => {
            task.assigned_to == Some(user_id) || task.created_by == Some(user_id)
        }
        TaskScope::Department(department_id) => task.department_id == department_id,
        TaskScope::Client(client_id) => {
            let project = Project::find_by_id(&state.db, task.project_id).await?;
            project.map(|p| p.client_id) == Some(client_id)
        }
        TaskScope::Nothing => false,
    };

    if visible {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Not authorized to access this task".to_string(),
        ))
    }
}

async fn find_task(state: &AppState, id: Uuid) -> ApiResult<Task> {
    Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Validates create/update references and rules shared by both paths
async fn validate_task_refs(
    state: &AppState,
    auth: &AuthContext,
    project_id: Uuid,
    department_id: Uuid,
    due_date: Option<DateTime<Utc>>,
    assigned_to: Option<Uuid>,
) -> ApiResult<()> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Project not found".to_string()))?;

    if !Department::exists(&state.db, department_id).await? {
        return Err(ApiError::BadRequest("Department not found".to_string()));
    }

    if let Some(due) = due_date {
        if !due_date_in_window(due, project.start_date, project.end_date) {
            return Err(ApiError::BadRequest(
                "Task due date must fall within the project timeline".to_string(),
            ));
        }
    }

    if let Some(assignee_id) = assigned_to {
        let assignee = User::find_by_id(&state.db, assignee_id)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Assigned user not found".to_string()))?;

        authorization::check_assignment_allowed(auth.role, assignee.role).map_err(|_| {
            ApiError::BadRequest(
                "Managers and assistant managers can only assign tasks to team leaders or employees"
                    .to_string(),
            )
        })?;
    }

    Ok(())
}

/// List tasks under the caller's visibility scope
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskSummary>>> {
    let scope = authorization::task_scope(&state.db, &auth).await?;
    Ok(Json(Task::list(&state.db, scope).await?))
}

/// Fetch one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskSummary>> {
    let task = find_task(&state, id).await?;
    check_task_visible(&state, &auth, &task).await?;

    let summary = Task::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(summary))
}

/// Create a task
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<TaskSummary>> {
    if auth.role == UserRole::Client {
        return Err(ApiError::Forbidden("Clients cannot create tasks".to_string()));
    }
    req.validate()?;

    validate_task_refs(
        &state,
        &auth,
        req.project_id,
        req.department_id,
        req.due_date,
        req.assigned_to,
    )
    .await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: req.project_id,
            department_id: req.department_id,
            title: req.title,
            description: req.description,
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            drive_folder_link: req.drive_folder_link,
            material_folder_link: req.material_folder_link,
        },
        auth.user_id,
    )
    .await?;

    record_audit(
        &state,
        task.id,
        auth.user_id,
        "created",
        Some(&format!("Task '{}' created", task.title)),
    )
    .await;

    if let Some(assignee) = task.assigned_to {
        notify(
            &state,
            assignee,
            &format!("You have been assigned a new task: {}", task.title),
            &task,
        )
        .await;
    }

    let summary = Task::find_summary(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Task vanished after create".to_string()))?;

    Ok(Json(summary))
}

/// Update task fields
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskSummary>> {
    req.validate()?;

    let existing = find_task(&state, id).await?;
    check_task_visible(&state, &auth, &existing).await?;

    let project_id = req.project_id.unwrap_or(existing.project_id);
    let department_id = req.department_id.unwrap_or(existing.department_id);
    let due_date = req.due_date.unwrap_or(existing.due_date);
    let assigned_to = req.assigned_to.unwrap_or(existing.assigned_to);

    validate_task_refs(&state, &auth, project_id, department_id, due_date, assigned_to).await?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            project_id: req.project_id,
            department_id: req.department_id,
            drive_folder_link: req.drive_folder_link,
            material_folder_link: req.material_folder_link,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let mut changes = Vec::new();
    if existing.title != task.title {
        changes.push(format!("title changed from '{}' to '{}'", existing.title, task.title));
    }
    if existing.assigned_to != task.assigned_to {
        changes.push("assignment changed".to_string());
    }
    if existing.due_date != task.due_date {
        changes.push("due date changed".to_string());
    }
    if !changes.is_empty() {
        record_audit(&state, id, auth.user_id, "updated", Some(&changes.join(", "))).await;
    }

    if existing.assigned_to != task.assigned_to {
        if let Some(new_assignee) = task.assigned_to {
            Task::record_assignment(&state.db, id, new_assignee).await?;
            notify(
                &state,
                new_assignee,
                &format!("You have been assigned to task: {}", task.title),
                &task,
            )
            .await;
        }
    }

    let summary = Task::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(summary))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let task = find_task(&state, id).await?;

    let allowed = auth.role.can_manage_users() || task.created_by == Some(auth.user_id);
    if !allowed {
        return Err(ApiError::Forbidden(
            "Only management or the task's creator may delete it".to_string(),
        ));
    }

    record_audit(
        &state,
        id,
        auth.user_id,
        "deleted",
        Some(&format!("Task '{}' deleted", task.title)),
    )
    .await;

    Task::delete(&state.db, id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Plain status transition
///
/// Validates legality centrally; the same status is a no-op.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TaskSummary>> {
    let task = find_task(&state, id).await?;
    check_task_visible(&state, &auth, &task).await?;

    if task.status != req.status {
        if !task.status.can_transition_to(req.status) {
            return Err(ApiError::BadRequest(format!(
                "Cannot move task from {} to {}",
                task.status.as_str(),
                req.status.as_str()
            )));
        }

        Task::transition(&state.db, id, task.status, req.status)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Task status changed concurrently; reload and retry".to_string())
            })?;

        record_audit(
            &state,
            id,
            auth.user_id,
            "status changed",
            Some(&format!("{} -> {}", task.status.as_str(), req.status.as_str())),
        )
        .await;
    }

    let summary = Task::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(summary))
}

/// List a task's comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskCommentView>>> {
    let task = find_task(&state, id).await?;
    check_task_visible(&state, &auth, &task).await?;

    Ok(Json(TaskComment::list_for_task(&state.db, id).await?))
}

/// Add a comment to a task
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<Json<TaskCommentView>> {
    req.validate()?;

    let task = find_task(&state, id).await?;
    check_task_visible(&state, &auth, &task).await?;

    let comment = TaskComment::create(&state.db, id, auth.user_id, req.body).await?;
    record_audit(&state, id, auth.user_id, "comment added", None).await;

    Ok(Json(comment))
}

/// List a task's attachments
pub async fn list_attachments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<AttachmentView>>> {
    let task = find_task(&state, id).await?;
    check_task_visible(&state, &auth, &task).await?;

    Ok(Json(Attachment::list_for_task(&state.db, id).await?))
}

/// Record an attachment against a task
pub async fn add_attachment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AttachmentRequest>,
) -> ApiResult<Json<AttachmentView>> {
    req.validate()?;

    let task = find_task(&state, id).await?;
    check_task_visible(&state, &auth, &task).await?;

    let attachment =
        Attachment::create(&state.db, id, auth.user_id, req.file_name, req.file_url).await?;

    record_audit(
        &state,
        id,
        auth.user_id,
        "attachment uploaded",
        Some(&attachment.file_name),
    )
    .await;

    Ok(Json(attachment))
}

/// Fetch a task's audit trail
pub async fn task_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<AuditLogView>>> {
    let task = find_task(&state, id).await?;
    check_task_visible(&state, &auth, &task).await?;

    Ok(Json(AuditLog::list_for_entity(&state.db, "task", id).await?))
}

/// Assignee submits the task for review
pub async fn request_completion(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskSummary>> {
    let task = find_task(&state, id).await?;

    if task.assigned_to != Some(auth.user_id) {
        return Err(ApiError::Forbidden(
            "Only the assignee can request completion".to_string(),
        ));
    }
    if !task.status.can_transition_to(TaskStatus::InReview) {
        return Err(ApiError::BadRequest(format!(
            "Cannot request completion from {}",
            task.status.as_str()
        )));
    }

    let task = Task::transition(&state.db, id, task.status, TaskStatus::InReview)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("Task status changed concurrently; reload and retry".to_string())
        })?;

    record_audit(&state, id, auth.user_id, "completion requested", None).await;

    if let Some(creator) = task.created_by {
        notify(
            &state,
            creator,
            &format!("Task '{}' marked as ready for review", task.title),
            &task,
        )
        .await;
    }
    if let Some(delegator) = task.delegated_by {
        if task.created_by != Some(delegator) {
            notify(
                &state,
                delegator,
                &format!("Task '{}' marked as ready for review", task.title),
                &task,
            )
            .await;
        }
    }

    let summary = Task::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(summary))
}

/// Reviewer approves, forwards to the client, or rejects
pub async fn review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<Json<TaskSummary>> {
    let task = find_task(&state, id).await?;

    if !authorization::can_review_task(&state.db, &auth, &task).await? {
        return Err(ApiError::Forbidden(
            "Only the task's creator, delegator, or the assignee's team leader can review it"
                .to_string(),
        ));
    }
    if task.status != TaskStatus::InReview {
        return Err(ApiError::BadRequest(
            "Task is not awaiting review".to_string(),
        ));
    }

    let assignee = task.assigned_to;

    if req.approve {
        let target = if req.forward_to_client {
            TaskStatus::SentToClient
        } else {
            TaskStatus::Done
        };

        let task = Task::transition(&state.db, id, TaskStatus::InReview, target)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Task status changed concurrently; reload and retry".to_string())
            })?;

        let (action, message) = if req.forward_to_client {
            ("sent to client", format!("Task '{}' was approved and sent for client review", task.title))
        } else {
            ("approved", format!("Task '{}' has been approved and marked as done", task.title))
        };

        record_audit(&state, id, auth.user_id, action, None).await;
        if let Some(assignee) = assignee {
            notify(&state, assignee, &message, &task).await;
        }
    } else {
        let notes = req
            .notes
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest("Rejection requires feedback notes".to_string())
            })?;

        let task = Task::transition(&state.db, id, TaskStatus::InReview, TaskStatus::InProgress)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Task status changed concurrently; reload and retry".to_string())
            })?;

        if let Some(new_due_date) = req.new_due_date {
            Task::set_due_date(&state.db, id, Some(new_due_date)).await?;
        }

        TaskComment::create(&state.db, id, auth.user_id, notes.to_string()).await?;
        record_audit(&state, id, auth.user_id, "review rejected", Some(notes)).await;

        if let Some(assignee) = assignee {
            notify(
                &state,
                assignee,
                &format!("Task '{}' review not approved: {}", task.title, notes),
                &task,
            )
            .await;
        }
    }

    let summary = Task::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(summary))
}

/// Client approves or rejects a task sent to them
pub async fn client_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ClientReviewRequest>,
) -> ApiResult<Json<TaskSummary>> {
    let task = find_task(&state, id).await?;

    let project = Project::find_by_id(&state.db, task.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if !authorization::can_client_review(&state.db, &auth, project.client_id).await? {
        return Err(ApiError::Forbidden(
            "Only the owning client can review this task".to_string(),
        ));
    }
    if task.status != TaskStatus::SentToClient {
        return Err(ApiError::BadRequest(
            "Task is not awaiting client review".to_string(),
        ));
    }

    let assignee = task.assigned_to;

    let (target, action) = if req.approve {
        (TaskStatus::Done, "client approved")
    } else {
        (TaskStatus::InProgress, "client rejected")
    };

    let notes = if req.approve {
        None
    } else {
        Some(
            req.notes
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| {
                    ApiError::BadRequest("Rejection requires feedback notes".to_string())
                })?
                .to_string(),
        )
    };

    let task = Task::transition(&state.db, id, TaskStatus::SentToClient, target)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("Task status changed concurrently; reload and retry".to_string())
        })?;

    if let Some(notes) = &notes {
        TaskComment::create(&state.db, id, auth.user_id, notes.clone()).await?;
    }
    record_audit(&state, id, auth.user_id, action, notes.as_deref()).await;

    let message = if req.approve {
        format!("Client approved task '{}'", task.title)
    } else {
        format!("Client rejected task '{}'", task.title)
    };
    for recipient in [assignee, task.created_by].into_iter().flatten() {
        notify(&state, recipient, &message, &task).await;
    }

    let summary = Task::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(summary))
}

/// Pass (delegate) the task to another user
pub async fn pass_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<PassTaskRequest>,
) -> ApiResult<Json<TaskSummary>> {
    if !auth.role.can_pass_tasks() {
        return Err(ApiError::Forbidden(
            "Only account managers and team leaders can pass tasks".to_string(),
        ));
    }

    let task = find_task(&state, id).await?;
    if task.status.is_terminal() {
        return Err(ApiError::BadRequest("Task is already done".to_string()));
    }

    if !User::exists(&state.db, req.assignee_id).await? {
        return Err(ApiError::BadRequest("Assignee not found".to_string()));
    }

    let task = Task::pass_to(&state.db, id, req.assignee_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    record_audit(&state, id, auth.user_id, "passed", None).await;
    notify(
        &state,
        req.assignee_id,
        &format!("Task '{}' has been passed to you", task.title),
        &task,
    )
    .await;

    let summary = Task::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(summary))
}

/// Extend an overdue task's deadline
pub async fn extend_deadline(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExtendDeadlineRequest>,
) -> ApiResult<Json<TaskSummary>> {
    if !auth.role.can_extend_deadlines() {
        return Err(ApiError::Forbidden(
            "Only management and team leaders can extend deadlines".to_string(),
        ));
    }
    req.validate()?;

    let task = find_task(&state, id).await?;

    if let Some(current) = task.due_date {
        if req.new_due_date <= current {
            return Err(ApiError::BadRequest(
                "New due date must be later than the current one".to_string(),
            ));
        }
    }

    let project = Project::find_by_id(&state.db, task.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    if !due_date_in_window(req.new_due_date, project.start_date, project.end_date) {
        return Err(ApiError::BadRequest(
            "New due date must fall within the project timeline".to_string(),
        ));
    }

    let task = Task::extend_deadline(&state.db, id, req.new_due_date)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    TaskComment::create(
        &state.db,
        id,
        auth.user_id,
        format!("Deadline extended: {}", req.reason),
    )
    .await?;
    record_audit(&state, id, auth.user_id, "deadline extended", Some(&req.reason)).await;

    if let Some(assignee) = task.assigned_to {
        notify(
            &state,
            assignee,
            &format!("Deadline for task '{}' was extended", task.title),
            &task,
        )
        .await;
    }

    let summary = Task::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(summary))
}
