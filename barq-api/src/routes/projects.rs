/// Project endpoints
///
/// # Endpoints
///
/// - `GET    /v1/projects` - list (clients see only their company's)
/// - `GET    /v1/projects/:id`
/// - `POST   /v1/projects` - create
/// - `PUT    /v1/projects/:id` - update; member sets replaced wholesale
/// - `DELETE /v1/projects/:id`
///
/// Invariants enforced here: the end date must fall after the start
/// date, every attached team leader must hold the team-leader role, and
/// referenced clients/departments must exist.

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
        audit::AuditLog,
        client::Client,
        department::Department,
        project::{CreateProject, Project, ProjectStatus, ProjectSummary, UpdateProject},
        user::{User, UserRole},
    },
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

const PROJECT_ADMIN_ROLES: &[UserRole] = &[
    UserRole::Manager,
    UserRole::AssistantManager,
    UserRole::AccountManager,
];

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub client_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub team_leader_ids: Vec<Uuid>,

    #[serde(default)]
    pub department_ids: Vec<Uuid>,
}

/// Update project request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<Option<String>>,

    pub client_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub team_leader_ids: Option<Vec<Uuid>>,
    pub department_ids: Option<Vec<Uuid>>,
}

fn check_dates(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> ApiResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(ApiError::BadRequest(
                "Project end date must be after the start date".to_string(),
            ));
        }
    }
    Ok(())
}

async fn validate_member_sets(
    state: &AppState,
    team_leader_ids: &[Uuid],
    department_ids: &[Uuid],
) -> ApiResult<()> {
    for user_id in team_leader_ids {
        let user = User::find_by_id(&state.db, *user_id)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Team leader not found".to_string()))?;
        if !user.role.can_lead_projects() {
            return Err(ApiError::BadRequest(format!(
                "{} does not hold the team leader role",
                user.full_name
            )));
        }
    }

    for department_id in department_ids {
        if !Department::exists(&state.db, *department_id).await? {
            return Err(ApiError::BadRequest("Department not found".to_string()));
        }
    }

    Ok(())
}

/// List projects under the caller's visibility
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    if auth.role == UserRole::Client {
        let user = User::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account not found".to_string()))?;
        return match user.client_id {
            Some(client_id) => Ok(Json(
                Project::list_summaries_for_client(&state.db, client_id).await?,
            )),
            None => Ok(Json(Vec::new())),
        };
    }

    Ok(Json(Project::list_summaries(&state.db).await?))
}

/// Fetch one project
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectSummary>> {
    let project = Project::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if auth.role == UserRole::Client {
        let user = User::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account not found".to_string()))?;
        if user.client_id != Some(project.client_id) {
            return Err(ApiError::Forbidden(
                "Clients can only view their own projects".to_string(),
            ));
        }
    }

    Ok(Json(project))
}

/// Create a project
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<ProjectSummary>> {
    authorization::require_any_role(&auth, PROJECT_ADMIN_ROLES)?;
    req.validate()?;
    check_dates(req.start_date, req.end_date)?;

    if !Client::exists(&state.db, req.client_id).await? {
        return Err(ApiError::BadRequest("Client not found".to_string()));
    }
    validate_member_sets(&state, &req.team_leader_ids, &req.department_ids).await?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            client_id: req.client_id,
            start_date: req.start_date,
            end_date: req.end_date,
            team_leader_ids: req.team_leader_ids,
            department_ids: req.department_ids,
        },
    )
    .await?;

    AuditLog::record(
        &state.db,
        "project",
        project.id,
        "created",
        Some(&format!("Project '{}' created", project.name)),
        auth.user_id,
    )
    .await?;

    let summary = Project::find_summary(&state.db, project.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Project vanished after create".to_string()))?;

    Ok(Json(summary))
}

/// Update a project
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectSummary>> {
    authorization::require_any_role(&auth, PROJECT_ADMIN_ROLES)?;
    req.validate()?;

    let existing = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    // Validate the window as it will be after the update
    let start = req.start_date.unwrap_or(existing.start_date);
    let end = req.end_date.unwrap_or(existing.end_date);
    check_dates(start, end)?;

    if let Some(client_id) = req.client_id {
        if !Client::exists(&state.db, client_id).await? {
            return Err(ApiError::BadRequest("Client not found".to_string()));
        }
    }
    validate_member_sets(
        &state,
        req.team_leader_ids.as_deref().unwrap_or(&[]),
        req.department_ids.as_deref().unwrap_or(&[]),
    )
    .await?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
            client_id: req.client_id,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
            team_leader_ids: req.team_leader_ids,
            department_ids: req.department_ids,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    AuditLog::record(
        &state.db,
        "project",
        project.id,
        "updated",
        None,
        auth.user_id,
    )
    .await?;

    let summary = Project::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(summary))
}

/// Delete a project
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorization::require_any_role(&auth, PROJECT_ADMIN_ROLES)?;

    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Project::delete(&state.db, id).await?;

    AuditLog::record(
        &state.db,
        "project",
        id,
        "deleted",
        Some(&format!("Project '{}' deleted", project.name)),
        auth.user_id,
    )
    .await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
