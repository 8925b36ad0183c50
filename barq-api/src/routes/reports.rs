/// Reporting endpoints (read-only aggregates)
///
/// # Endpoints
///
/// - `GET /v1/reports/overview` - system-wide counts (management)
/// - `GET /v1/reports/projects/:id?from=&to=`
/// - `GET /v1/reports/users/:id?from=&to=` - over assignment history
/// - `GET /v1/reports/departments/:id?from=&to=`
///
/// The optional window filters by task creation date. Export formats
/// (CSV etc.) are not served here.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use barq_shared::{
    auth::{authorization, middleware::AuthContext},
    models::reports::{
        self, DepartmentReport, ProjectReport, ReportWindow, SystemOverview,
        UserPerformanceReport,
    },
    models::user::UserRole,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

const REPORT_ROLES: &[UserRole] = &[
    UserRole::Manager,
    UserRole::AssistantManager,
    UserRole::AccountManager,
    UserRole::TeamLeader,
];

/// Report window query parameters
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl WindowParams {
    fn into_window(self) -> ReportWindow {
        ReportWindow {
            from: self.from,
            to: self.to,
        }
    }
}

/// System-wide overview (management)
pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<SystemOverview>> {
    authorization::require_user_management(&auth)?;

    Ok(Json(reports::system_overview(&state.db).await?))
}

/// Project report
pub async fn project_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<ProjectReport>> {
    authorization::require_any_role(&auth, REPORT_ROLES)?;

    let report = reports::project_report(&state.db, id, params.into_window())
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(report))
}

/// User performance report
///
/// Team leaders and up may read anyone's; everyone may read their own.
pub async fn user_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<UserPerformanceReport>> {
    if id != auth.user_id {
        authorization::require_any_role(&auth, REPORT_ROLES)?;
    }

    let report = reports::user_performance_report(&state.db, id, params.into_window())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(report))
}

/// Department report
pub async fn department_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<DepartmentReport>> {
    authorization::require_any_role(&auth, REPORT_ROLES)?;

    let report = reports::department_report(&state.db, id, params.into_window())
        .await?
        .ok_or_else(|| ApiError::NotFound("Department not found".to_string()))?;

    Ok(Json(report))
}
