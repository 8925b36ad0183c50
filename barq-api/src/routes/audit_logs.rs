/// Audit log endpoints (management only)
///
/// # Endpoints
///
/// - `GET /v1/audit-logs?entity_type=&entity_id=&user_id=&limit=&offset=`
/// - `GET /v1/audit-logs/stats`

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use barq_shared::{
    auth::{authorization, middleware::AuthContext},
    models::audit::{AuditFilter, AuditLog, AuditLogView, AuditStats},
};
use serde::Deserialize;
use uuid::Uuid;

/// Audit query parameters
#[derive(Debug, Deserialize)]
pub struct AuditParams {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List audit entries under optional filters
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<AuditParams>,
) -> ApiResult<Json<Vec<AuditLogView>>> {
    authorization::require_user_management(&auth)?;

    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let offset = params.offset.unwrap_or(0).max(0);

    let logs = AuditLog::list(
        &state.db,
        AuditFilter {
            entity_type: params.entity_type,
            entity_id: params.entity_id,
            user_id: params.user_id,
        },
        limit,
        offset,
    )
    .await?;

    Ok(Json(logs))
}

/// Aggregate audit counts
pub async fn audit_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AuditStats>> {
    authorization::require_user_management(&auth)?;

    Ok(Json(AuditLog::stats(&state.db).await?))
}
