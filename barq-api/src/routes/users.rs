/// User administration endpoints
///
/// # Endpoints
///
/// - `GET    /v1/users` - list users
/// - `GET    /v1/users/:id` - fetch one user
/// - `POST   /v1/users` - create a user (management only)
/// - `PUT    /v1/users/:id` - update a user (management only)
/// - `DELETE /v1/users/:id` - delete a user (management only)
///
/// Password hashes never leave this module; responses use a trimmed
/// profile view.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use barq_shared::{
    auth::{authorization, middleware::AuthContext, password},
    models::{
        department::Department,
        user::{CreateUser, UpdateUser, User, UserRole},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User profile returned by the API (no password hash)
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub role: UserRole,
    pub team_leader_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            position: user.position,
            role: user.role,
            team_leader_id: user.team_leader_id,
            department_id: user.department_id,
            client_id: user.client_id,
            is_active: user.is_active,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: String,

    pub role: UserRole,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub team_leader_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// Update user request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: Option<String>,

    pub role: Option<UserRole>,
    pub phone: Option<Option<String>>,
    pub position: Option<Option<String>>,
    pub team_leader_id: Option<Option<Uuid>>,
    pub department_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

/// List pagination parameters
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Checks the supervisor reference actually points at a team leader
async fn validate_team_leader(state: &AppState, team_leader_id: Uuid) -> ApiResult<()> {
    let leader = User::find_by_id(&state.db, team_leader_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Team leader not found".to_string()))?;

    if !leader.role.can_lead_projects() {
        return Err(ApiError::BadRequest(
            "Referenced user does not hold the team leader role".to_string(),
        ));
    }

    Ok(())
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let limit = params.limit.unwrap_or(100).clamp(1, 500);
    let offset = params.offset.unwrap_or(0).max(0);

    let users = User::list(&state.db, limit, offset).await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// Fetch one user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Create a user (management only)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    authorization::require_user_management(&auth)?;
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    if let Some(team_leader_id) = req.team_leader_id {
        validate_team_leader(&state, team_leader_id).await?;
    }
    if let Some(department_id) = req.department_id {
        if !Department::exists(&state.db, department_id).await? {
            return Err(ApiError::BadRequest("Department not found".to_string()));
        }
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            full_name: req.full_name,
            phone: req.phone,
            position: req.position,
            role: req.role,
            team_leader_id: req.team_leader_id,
            department_id: req.department_id,
            client_id: req.client_id,
        },
    )
    .await?;

    Ok(Json(user.into()))
}

/// Update a user (management only)
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    authorization::require_user_management(&auth)?;
    req.validate()?;

    if let Some(Some(team_leader_id)) = req.team_leader_id {
        validate_team_leader(&state, team_leader_id).await?;
    }
    if let Some(Some(department_id)) = req.department_id {
        if !Department::exists(&state.db, department_id).await? {
            return Err(ApiError::BadRequest("Department not found".to_string()));
        }
    }

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            username: req.username,
            email: req.email,
            password_hash: None,
            full_name: req.full_name,
            phone: req.phone,
            position: req.position,
            role: req.role,
            team_leader_id: req.team_leader_id,
            department_id: req.department_id,
            client_id: None,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Delete a user (management only)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorization::require_user_management(&auth)?;

    if auth.user_id == id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
