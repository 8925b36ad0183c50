/// Application state and router builder
///
/// Defines the shared state handed to every handler and assembles the
/// full Axum router with middleware.
///
/// # Example
///
/// ```no_run
/// use barq_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = barq_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use barq_shared::auth::{jwt, middleware::AuthContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; `Arc` keeps the
/// clone cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router
///
/// # Route map
///
/// ```text
/// /
/// ├── /health                          # liveness (public)
/// └── /v1/
///     ├── /auth/…                      # login, register, refresh, password reset (public)
///     ├── /users/…                     # user administration
///     ├── /departments/…
///     ├── /clients/…
///     ├── /projects/…
///     ├── /tasks/…                     # CRUD + review workflow
///     ├── /notifications/…
///     ├── /calendar/…                  # events, RSVP, recurrence view, sync
///     ├── /reports/…                   # read-only aggregates
///     ├── /search
///     └── /audit-logs/…
/// ```
///
/// Everything except `/health` and `/v1/auth` sits behind the JWT layer.
/// Rate limiting, tracing, CORS and security headers wrap the lot.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route(
            "/password-reset/request",
            post(routes::auth::request_password_reset),
        )
        .route(
            "/password-reset/confirm",
            post(routes::auth::confirm_password_reset),
        );

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/", post(routes::users::create_user))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", put(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user));

    let department_routes = Router::new()
        .route("/", get(routes::departments::list_departments))
        .route("/", post(routes::departments::create_department))
        .route("/:id", get(routes::departments::get_department))
        .route("/:id", put(routes::departments::update_department))
        .route("/:id", delete(routes::departments::delete_department));

    let client_routes = Router::new()
        .route("/", get(routes::clients::list_clients))
        .route("/", post(routes::clients::create_client))
        .route("/:id", get(routes::clients::get_client))
        .route("/:id", put(routes::clients::update_client))
        .route("/:id", delete(routes::clients::delete_client))
        .route("/:id/projects", get(routes::clients::client_projects));

    let project_routes = Router::new()
        .route("/", get(routes::projects::list_projects))
        .route("/", post(routes::projects::create_project))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", put(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/status", put(routes::tasks::update_status))
        .route("/:id/comments", get(routes::tasks::list_comments))
        .route("/:id/comments", post(routes::tasks::add_comment))
        .route("/:id/attachments", get(routes::tasks::list_attachments))
        .route("/:id/attachments", post(routes::tasks::add_attachment))
        .route("/:id/history", get(routes::tasks::task_history))
        .route(
            "/:id/request-completion",
            post(routes::tasks::request_completion),
        )
        .route("/:id/review", post(routes::tasks::review))
        .route("/:id/client-review", post(routes::tasks::client_review))
        .route("/:id/pass", post(routes::tasks::pass_task))
        .route("/:id/extend-deadline", post(routes::tasks::extend_deadline));

    let notification_routes = Router::new()
        .route("/", get(routes::notifications::list_notifications))
        .route("/unread", get(routes::notifications::list_unread))
        .route("/unread/count", get(routes::notifications::unread_count))
        .route("/read-all", put(routes::notifications::mark_all_read))
        .route("/:id/read", put(routes::notifications::mark_read))
        .route("/:id", delete(routes::notifications::delete_notification));

    let calendar_routes = Router::new()
        .route("/events", post(routes::calendar::create_event))
        .route("/events", get(routes::calendar::list_events))
        .route("/events/upcoming", get(routes::calendar::upcoming_events))
        .route("/events/:id", get(routes::calendar::get_event))
        .route("/events/:id", put(routes::calendar::update_event))
        .route("/events/:id", delete(routes::calendar::delete_event))
        .route(
            "/events/:id/attendees/:user_id/status",
            put(routes::calendar::update_attendee_status),
        )
        .route("/stats", get(routes::calendar::calendar_stats))
        .route(
            "/sync/task-deadlines",
            post(routes::calendar::sync_task_deadlines),
        )
        .route(
            "/sync/project-milestones",
            post(routes::calendar::sync_project_milestones),
        );

    let report_routes = Router::new()
        .route("/overview", get(routes::reports::overview))
        .route("/projects/:id", get(routes::reports::project_report))
        .route("/users/:id", get(routes::reports::user_report))
        .route("/departments/:id", get(routes::reports::department_report));

    let audit_routes = Router::new()
        .route("/", get(routes::audit_logs::list_audit_logs))
        .route("/stats", get(routes::audit_logs::audit_stats));

    // Everything below requires a valid access token
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/departments", department_routes)
        .nest("/clients", client_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/notifications", notification_routes)
        .nest("/calendar", calendar_routes)
        .nest("/reports", report_routes)
        .route("/search", get(routes::search::search))
        .nest("/audit-logs", audit_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(axum::middleware::from_fn(
            crate::middleware::rate_limit::rate_limit_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer token and injects [`AuthContext`] into request
/// extensions for handlers to extract.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
