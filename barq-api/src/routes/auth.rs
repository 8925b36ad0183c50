/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - register a new user
/// - `POST /v1/auth/login` - login and get tokens (lockout-aware)
/// - `POST /v1/auth/refresh` - refresh the access token
/// - `POST /v1/auth/password-reset/request` - request a reset token
/// - `POST /v1/auth/password-reset/confirm` - set a new password
///
/// Every login attempt is recorded; five failures within the lockout
/// window refuse further attempts for that username. Reset requests
/// always answer 200 so the endpoint cannot be used to probe which
/// emails exist.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::HeaderMap, Json};
use barq_shared::{
    auth::{jwt, password, reset},
    models::{
        login_attempt::LoginAttempt,
        user::{CreateUser, UpdateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: String,

    /// Role for the new account (defaults to employee)
    pub role: Option<UserRole>,

    pub phone: Option<String>,
    pub position: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    pub password: String,
}

/// Token pair response shared by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    /// Access token (24h)
    pub access_token: String,
    /// Refresh token (30d)
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<(String, String)> {
    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok((access_token, refresh_token))
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Register a new user
///
/// # Errors
///
/// - `409 Conflict`: username or email already taken
/// - `422 Unprocessable Entity`: validation or weak password
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

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
            role: req.role.unwrap_or(UserRole::Employee),
            team_leader_id: None,
            department_id: None,
            client_id: None,
        },
    )
    .await?;

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;

    Ok(Json(AuthResponse {
        user_id: user.id.to_string(),
        username: user.username,
        full_name: user.full_name,
        role: user.role,
        access_token,
        refresh_token,
        expires_in: 24 * 3600,
    }))
}

/// Login with username and password
///
/// # Errors
///
/// - `401 Unauthorized`: bad credentials or inactive account
/// - `429 Too Many Requests`: account locked out
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let ip = client_ip(&headers);
    let agent = user_agent(&headers);

    if reset::is_account_locked(&state.db, &req.username).await? {
        LoginAttempt::record(
            &state.db,
            &req.username,
            ip.as_deref(),
            agent.as_deref(),
            false,
            Some("locked"),
        )
        .await?;
        return Err(ApiError::RateLimitExceeded {
            retry_after: (reset::LOCKOUT_WINDOW_MINUTES * 60) as u64,
            message: "Account temporarily locked after repeated failures".to_string(),
        });
    }

    let mut authenticated = None;
    if let Some(user) = User::find_by_username(&state.db, &req.username).await? {
        if user.is_active && password::verify_password(&req.password, &user.password_hash)? {
            authenticated = Some(user);
        }
    }

    let user = match authenticated {
        Some(user) => user,
        None => {
            LoginAttempt::record(
                &state.db,
                &req.username,
                ip.as_deref(),
                agent.as_deref(),
                false,
                Some("bad credentials"),
            )
            .await?;
            return Err(ApiError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }
    };

    LoginAttempt::record(
        &state.db,
        &req.username,
        ip.as_deref(),
        agent.as_deref(),
        true,
        None,
    )
    .await?;
    User::update_last_login(&state.db, user.id).await?;

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;

    Ok(Json(AuthResponse {
        user_id: user.id.to_string(),
        username: user.username,
        full_name: user.full_name,
        role: user.role,
        access_token,
        refresh_token,
        expires_in: 24 * 3600,
    }))
}

/// Exchange a refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Request a password reset token
///
/// Always answers 200; whether the email matched an account is not
/// revealed. Token delivery (email) happens outside this service.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        let _token = reset::issue_reset_token(&state.db, user.id).await?;
        tracing::info!(user_id = %user.id, "Password reset token issued");
    }

    Ok(Json(MessageResponse {
        message: "If the email is registered, a reset link has been sent".to_string(),
    }))
}

/// Confirm a password reset with a token and a new password
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let user_id = reset::consume_reset_token(&state.db, &req.token)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    let password_hash = password::hash_password(&req.new_password)?;
    User::update(
        &state.db,
        user_id,
        UpdateUser {
            password_hash: Some(password_hash),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}
