/// Cross-entity search endpoint
///
/// # Endpoint
///
/// ```text
/// GET /v1/search?q=<query>&kind=<task|project|user|client>
/// ```
///
/// Substring search across tasks, projects, users and clients; `kind`
/// narrows to one entity type. Client-role callers are refused; their
/// data access goes through the scoped list endpoints.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use barq_shared::{
    auth::middleware::AuthContext,
    models::reports::{self, SearchHit},
};
use serde::Deserialize;

const PER_KIND_LIMIT: i64 = 25;
const VALID_KINDS: &[&str] = &["task", "project", "user", "client"];

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub kind: Option<String>,
}

/// Search handler
pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    if !auth.role.is_internal() {
        return Err(ApiError::Forbidden(
            "Search is limited to internal users".to_string(),
        ));
    }

    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_string()));
    }

    let kind = params.kind.as_deref();
    if let Some(kind) = kind {
        if !VALID_KINDS.contains(&kind) {
            return Err(ApiError::BadRequest(format!(
                "Unknown search kind '{}'; expected one of {}",
                kind,
                VALID_KINDS.join(", ")
            )));
        }
    }

    Ok(Json(
        reports::search(&state.db, query, kind, PER_KIND_LIMIT).await?,
    ))
}
