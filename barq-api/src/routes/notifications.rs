/// Notification endpoints
///
/// All endpoints operate on the caller's own notifications; there is no
/// way to read or mutate another user's feed.
///
/// # Endpoints
///
/// - `GET    /v1/notifications` - full feed, newest first
/// - `GET    /v1/notifications/unread`
/// - `GET    /v1/notifications/unread/count`
/// - `PUT    /v1/notifications/:id/read`
/// - `PUT    /v1/notifications/read-all`
/// - `DELETE /v1/notifications/:id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use barq_shared::{
    auth::middleware::AuthContext,
    models::notification::{Notification, NotificationView},
};
use serde::Serialize;
use uuid::Uuid;

/// Unread count response
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// List the caller's notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<NotificationView>>> {
    Ok(Json(
        Notification::list_for_user(&state.db, auth.user_id, false).await?,
    ))
}

/// List the caller's unread notifications
pub async fn list_unread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<NotificationView>>> {
    Ok(Json(
        Notification::list_for_user(&state.db, auth.user_id, true).await?,
    ))
}

/// Count the caller's unread notifications
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let count = Notification::unread_count(&state.db, auth.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark one notification as read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = Notification::mark_read(&state.db, id, auth.user_id).await?;
    if !updated {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "read": true })))
}

/// Mark all of the caller's notifications as read
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = Notification::mark_all_read(&state.db, auth.user_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

/// Delete one of the caller's notifications
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Notification::delete(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
