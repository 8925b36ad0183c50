/// Calendar endpoints
///
/// # Endpoints
///
/// - `POST   /v1/calendar/events` - create an event (attendees + reminders)
/// - `GET    /v1/calendar/events?from=&to=` - window view with recurring
///   events expanded into occurrences
/// - `GET    /v1/calendar/events/upcoming?days=` - rolling window view
/// - `GET    /v1/calendar/events/:id` - event with attendee list
/// - `PUT    /v1/calendar/events/:id`
/// - `DELETE /v1/calendar/events/:id`
/// - `PUT    /v1/calendar/events/:id/attendees/:user_id/status` - RSVP
/// - `GET    /v1/calendar/stats`
/// - `POST   /v1/calendar/sync/task-deadlines` (management)
/// - `POST   /v1/calendar/sync/project-milestones` (management)
///
/// Window queries return occurrences, not rows: a recurring event shows
/// up once per concrete instance inside the window, each carrying the
/// parent event id and its position in the series.

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
    models::calendar::{
        AttendeeStatus, CalendarEvent, CreateEvent, EventAttendee, EventType, UpdateEvent,
    },
    recurrence,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One concrete calendar entry in a window view
#[derive(Debug, Serialize)]
pub struct OccurrenceView {
    /// Parent event id; occurrences have no identity of their own
    pub event_id: Uuid,
    /// Position in the recurring series (0 for one-off events)
    pub occurrence_index: u32,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub color: String,
    pub event_type: EventType,
    pub is_recurring: bool,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl OccurrenceView {
    fn new(event: &CalendarEvent, occurrence: &recurrence::Occurrence) -> Self {
        Self {
            event_id: event.id,
            occurrence_index: occurrence.index,
            title: event.title.clone(),
            description: event.description.clone(),
            start_time: occurrence.start,
            end_time: occurrence.end,
            all_day: event.all_day,
            color: event.color.clone(),
            event_type: event.event_type,
            is_recurring: event.is_recurring,
            task_id: event.task_id,
            project_id: event.project_id,
        }
    }
}

/// Event with its attendee list
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub attendees: Vec<EventAttendee>,
}

/// Window query parameters
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Upcoming query parameters
#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    pub days: Option<i64>,
}

/// RSVP request
#[derive(Debug, Deserialize)]
pub struct AttendeeStatusRequest {
    pub status: AttendeeStatus,
}

/// Calendar stats response
#[derive(Debug, Serialize)]
pub struct CalendarStats {
    pub total_events: i64,
}

/// Sync result response
#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub created: u64,
}

fn check_event_times(start: DateTime<Utc>, end: DateTime<Utc>) -> ApiResult<()> {
    if end <= start {
        return Err(ApiError::BadRequest(
            "Event end time must be after the start time".to_string(),
        ));
    }
    Ok(())
}

async fn expand_window(
    state: &AppState,
    user_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> ApiResult<Vec<OccurrenceView>> {
    if to <= from {
        return Err(ApiError::BadRequest(
            "Window end must be after its start".to_string(),
        ));
    }

    let events = CalendarEvent::list_for_user_in_window(&state.db, user_id, from, to).await?;

    let mut views = Vec::new();
    for event in &events {
        for occurrence in recurrence::expand_event(event, from, to) {
            views.push(OccurrenceView::new(event, &occurrence));
        }
    }
    views.sort_by_key(|v| v.start_time);

    Ok(views)
}

/// Create a calendar event
pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateEvent>,
) -> ApiResult<Json<EventDetail>> {
    check_event_times(req.start_time, req.end_time)?;

    if req.is_recurring && req.recurrence_pattern.is_none() {
        return Err(ApiError::BadRequest(
            "Recurring events need a recurrence pattern".to_string(),
        ));
    }
    if let Some(interval) = req.recurrence_interval {
        if interval < 1 {
            return Err(ApiError::BadRequest(
                "Recurrence interval must be at least 1".to_string(),
            ));
        }
    }

    let event = CalendarEvent::create(&state.db, req, auth.user_id).await?;
    let attendees = CalendarEvent::attendees(&state.db, event.id).await?;

    Ok(Json(EventDetail { event, attendees }))
}

/// Window view with recurrence expansion
pub async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<Vec<OccurrenceView>>> {
    let from = params.from.unwrap_or_else(Utc::now);
    let to = params.to.unwrap_or_else(|| from + Duration::days(30));

    Ok(Json(expand_window(&state, auth.user_id, from, to).await?))
}

/// Rolling upcoming-events view
pub async fn upcoming_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<UpcomingParams>,
) -> ApiResult<Json<Vec<OccurrenceView>>> {
    let days = params.days.unwrap_or(7).clamp(1, 365);
    let from = Utc::now();
    let to = from + Duration::days(days);

    Ok(Json(expand_window(&state, auth.user_id, from, to).await?))
}

/// Fetch one event with attendees
pub async fn get_event(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventDetail>> {
    let event = CalendarEvent::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Calendar event not found".to_string()))?;
    let attendees = CalendarEvent::attendees(&state.db, id).await?;

    Ok(Json(EventDetail { event, attendees }))
}

/// Update an event (creator or management)
pub async fn update_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEvent>,
) -> ApiResult<Json<EventDetail>> {
    let existing = CalendarEvent::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Calendar event not found".to_string()))?;

    if existing.created_by != Some(auth.user_id) && !auth.role.can_manage_users() {
        return Err(ApiError::Forbidden(
            "Only the event's creator or management can modify it".to_string(),
        ));
    }

    let start = req.start_time.unwrap_or(existing.start_time);
    let end = req.end_time.unwrap_or(existing.end_time);
    check_event_times(start, end)?;

    let event = CalendarEvent::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Calendar event not found".to_string()))?;
    let attendees = CalendarEvent::attendees(&state.db, id).await?;

    Ok(Json(EventDetail { event, attendees }))
}

/// Delete an event (creator or management)
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let existing = CalendarEvent::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Calendar event not found".to_string()))?;

    if existing.created_by != Some(auth.user_id) && !auth.role.can_manage_users() {
        return Err(ApiError::Forbidden(
            "Only the event's creator or management can delete it".to_string(),
        ));
    }

    CalendarEvent::delete(&state.db, id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Record the caller's RSVP for an event
///
/// Attendees can only answer for themselves.
pub async fn update_attendee_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((event_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AttendeeStatusRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You can only update your own attendance".to_string(),
        ));
    }

    let updated =
        CalendarEvent::set_attendee_status(&state.db, event_id, user_id, req.status).await?;
    if !updated {
        return Err(ApiError::NotFound(
            "You are not an attendee of this event".to_string(),
        ));
    }

    Ok(Json(serde_json::json!({ "updated": true })))
}

/// Event count for the caller
pub async fn calendar_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CalendarStats>> {
    let total_events = CalendarEvent::count_for_user(&state.db, auth.user_id).await?;
    Ok(Json(CalendarStats { total_events }))
}

/// Create deadline events for open tasks with due dates (management)
pub async fn sync_task_deadlines(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<SyncResult>> {
    authorization::require_user_management(&auth)?;

    let created = CalendarEvent::sync_task_deadlines(&state.db).await?;
    Ok(Json(SyncResult { created }))
}

/// Create milestone events for project end dates (management)
pub async fn sync_project_milestones(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<SyncResult>> {
    authorization::require_user_management(&auth)?;

    let created = CalendarEvent::sync_project_milestones(&state.db).await?;
    Ok(Json(SyncResult { created }))
}
