/// Client company endpoints
///
/// # Endpoints
///
/// - `GET    /v1/clients` - list with project counts (internal roles)
/// - `GET    /v1/clients/:id`
/// - `POST   /v1/clients` - create, optionally provisioning the owner login
/// - `PUT    /v1/clients/:id`
/// - `DELETE /v1/clients/:id`
/// - `GET    /v1/clients/:id/projects` - the company's projects
///
/// Creating a client without an existing owner user provisions a
/// `client`-role account in the same transaction, so the company and its
/// login appear together or not at all.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use barq_shared::{
    auth::{authorization, middleware::AuthContext, password},
    models::{
        client::{Client, ClientSummary, CreateClient, UpdateClient},
        project::{Project, ProjectSummary},
        user::{CreateUser, User, UserRole},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

const CLIENT_ADMIN_ROLES: &[UserRole] = &[
    UserRole::Manager,
    UserRole::AssistantManager,
    UserRole::AccountManager,
];

/// Owner login provisioning nested in client creation
#[derive(Debug, Deserialize, Validate)]
pub struct OwnerRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: String,
}

/// Create client request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,

    /// Existing user to use as the company's login
    pub owner_user_id: Option<Uuid>,

    /// New login to provision when no existing user is given
    #[validate(nested)]
    pub owner: Option<OwnerRequest>,

    pub account_manager_id: Option<Uuid>,
}

/// Update client request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub account_manager_id: Option<Option<Uuid>>,
}

/// Checks the account manager reference holds the account manager role
async fn validate_account_manager(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Account manager not found".to_string()))?;

    if user.role != UserRole::AccountManager {
        return Err(ApiError::BadRequest(
            "Referenced user does not hold the account manager role".to_string(),
        ));
    }

    Ok(())
}

/// List clients (internal roles)
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ClientSummary>>> {
    if !auth.role.is_internal() {
        return Err(ApiError::Forbidden(
            "Clients cannot list other companies".to_string(),
        ));
    }

    Ok(Json(Client::list_summaries(&state.db).await?))
}

/// Fetch one client
pub async fn get_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClientSummary>> {
    if !auth.role.is_internal() {
        let user = User::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account not found".to_string()))?;
        if user.client_id != Some(id) {
            return Err(ApiError::Forbidden(
                "Clients can only view their own company".to_string(),
            ));
        }
    }

    let client = Client::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    Ok(Json(client))
}

/// Create a client company
pub async fn create_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<Json<ClientSummary>> {
    authorization::require_any_role(&auth, CLIENT_ADMIN_ROLES)?;
    req.validate()?;

    if let Some(account_manager_id) = req.account_manager_id {
        validate_account_manager(&state, account_manager_id).await?;
    }

    let owner = match (&req.owner_user_id, req.owner) {
        (Some(existing), _) => {
            if !User::exists(&state.db, *existing).await? {
                return Err(ApiError::BadRequest("Owner user not found".to_string()));
            }
            None
        }
        (None, Some(owner)) => {
            password::validate_password_strength(&owner.password).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "owner.password".to_string(),
                    message: e,
                }])
            })?;
            let password_hash = password::hash_password(&owner.password)?;
            Some(CreateUser {
                username: owner.username,
                email: req.email.clone().unwrap_or_default(),
                password_hash,
                full_name: owner.full_name,
                phone: req.phone.clone(),
                position: None,
                role: UserRole::Client,
                team_leader_id: None,
                department_id: None,
                client_id: None,
            })
        }
        (None, None) => None,
    };

    let client = Client::create_with_owner(
        &state.db,
        CreateClient {
            name: req.name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            owner_user_id: req.owner_user_id,
            account_manager_id: req.account_manager_id,
        },
        owner,
    )
    .await?;

    let summary = Client::find_summary(&state.db, client.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Client vanished after create".to_string()))?;

    Ok(Json(summary))
}

/// Update a client company
pub async fn update_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientSummary>> {
    authorization::require_any_role(&auth, CLIENT_ADMIN_ROLES)?;
    req.validate()?;

    if let Some(Some(account_manager_id)) = req.account_manager_id {
        validate_account_manager(&state, account_manager_id).await?;
    }

    Client::update(
        &state.db,
        id,
        UpdateClient {
            name: req.name,
            email: req.email.map(Some),
            phone: req.phone,
            address: req.address,
            account_manager_id: req.account_manager_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    let summary = Client::find_summary(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    Ok(Json(summary))
}

/// Delete a client company
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorization::require_any_role(&auth, CLIENT_ADMIN_ROLES)?;

    let deleted = Client::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Client not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// List a client's projects
pub async fn client_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    if !auth.role.is_internal() {
        let user = User::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account not found".to_string()))?;
        if user.client_id != Some(id) {
            return Err(ApiError::Forbidden(
                "Clients can only view their own projects".to_string(),
            ));
        }
    }

    if !Client::exists(&state.db, id).await? {
        return Err(ApiError::NotFound("Client not found".to_string()));
    }

    Ok(Json(Project::list_summaries_for_client(&state.db, id).await?))
}
