/// Department endpoints
///
/// # Endpoints
///
/// - `GET    /v1/departments` - list with user/task counts
/// - `GET    /v1/departments/:id`
/// - `POST   /v1/departments` - create (management only)
/// - `PUT    /v1/departments/:id` - update (management only)
/// - `DELETE /v1/departments/:id` - delete; 409 while users or tasks remain

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
    models::department::{CreateDepartment, DeleteOutcome, Department, DepartmentSummary},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create/update department request
#[derive(Debug, Deserialize, Validate)]
pub struct DepartmentRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// List departments with counts
pub async fn list_departments(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<DepartmentSummary>>> {
    Ok(Json(Department::list_with_counts(&state.db).await?))
}

/// Fetch one department
pub async fn get_department(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Department>> {
    let department = Department::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Department not found".to_string()))?;

    Ok(Json(department))
}

/// Create a department (management only)
pub async fn create_department(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DepartmentRequest>,
) -> ApiResult<Json<Department>> {
    authorization::require_user_management(&auth)?;
    req.validate()?;

    let department = Department::create(
        &state.db,
        CreateDepartment {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(department))
}

/// Update a department (management only)
pub async fn update_department(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<DepartmentRequest>,
) -> ApiResult<Json<Department>> {
    authorization::require_user_management(&auth)?;
    req.validate()?;

    let department = Department::update(&state.db, id, req.name, req.description)
        .await?
        .ok_or_else(|| ApiError::NotFound("Department not found".to_string()))?;

    Ok(Json(department))
}

/// Delete a department (management only)
///
/// Refused with 409 while users or tasks still reference it.
pub async fn delete_department(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorization::require_user_management(&auth)?;

    match Department::delete_guarded(&state.db, id).await? {
        DeleteOutcome::Deleted => Ok(Json(serde_json::json!({ "deleted": true }))),
        DeleteOutcome::NotFound => Err(ApiError::NotFound("Department not found".to_string())),
        DeleteOutcome::InUse => Err(ApiError::Conflict(
            "Department still has users or tasks assigned".to_string(),
        )),
    }
}
