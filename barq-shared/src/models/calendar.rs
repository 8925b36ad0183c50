/// Calendar event model and database operations
///
/// Events can stand alone or link to a task, project, department or user.
/// Each event carries an attendee list (with RSVP state) and reminders
/// (dispatched by the worker). Recurring events store their pattern here;
/// expansion into concrete occurrences is pure and lives in
/// [`crate::recurrence`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE event_type AS ENUM (
///     'meeting', 'deadline', 'task', 'milestone', 'personal', 'holiday'
/// );
/// CREATE TYPE recurrence_pattern AS ENUM (
///     'daily', 'weekly', 'monthly', 'yearly', 'weekdays'
/// );
/// CREATE TYPE attendee_status AS ENUM ('pending', 'accepted', 'declined', 'tentative');
/// CREATE TYPE reminder_kind AS ENUM ('popup', 'email');
///
/// CREATE TABLE calendar_events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description VARCHAR(1000),
///     start_time TIMESTAMPTZ NOT NULL,
///     end_time TIMESTAMPTZ NOT NULL,
///     all_day BOOLEAN NOT NULL DEFAULT FALSE,
///     color VARCHAR(7) NOT NULL DEFAULT '#007bff',
///     event_type event_type NOT NULL DEFAULT 'meeting',
///     task_id UUID REFERENCES tasks(id) ON DELETE CASCADE,
///     project_id UUID REFERENCES projects(id) ON DELETE CASCADE,
///     department_id UUID REFERENCES departments(id) ON DELETE CASCADE,
///     user_id UUID REFERENCES users(id) ON DELETE CASCADE,
///     is_recurring BOOLEAN NOT NULL DEFAULT FALSE,
///     recurrence_pattern recurrence_pattern,
///     recurrence_interval INTEGER,
///     recurrence_end TIMESTAMPTZ,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK (end_time > start_time)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Kind of calendar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Meeting,
    Deadline,
    Task,
    Milestone,
    Personal,
    Holiday,
}

/// How a recurring event repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recurrence_pattern", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Monday through Friday; the interval is ignored
    Weekdays,
}

/// RSVP state of an attendee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendee_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendeeStatus {
    Pending,
    Accepted,
    Declined,
    Tentative,
}

/// Delivery channel of a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Popup,
    Email,
}

/// Calendar event row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub color: String,
    pub event_type: EventType,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    /// Every N days/weeks/months/years (defaults to 1)
    pub recurrence_interval: Option<i32>,
    pub recurrence_end: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendee row with the user's name joined in
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventAttendee {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub status: AttendeeStatus,
    pub is_organizer: bool,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Reminder row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventReminder {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub minutes_before: i32,
    pub kind: ReminderKind,
    pub is_active: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

/// A reminder joined with its event, ready for dispatch
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DueReminder {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub minutes_before: i32,
    pub kind: ReminderKind,
    pub event_title: String,
    pub event_start: DateTime<Utc>,
}

/// Input for creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    pub color: Option<String>,
    pub event_type: EventType,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub recurrence_interval: Option<i32>,
    pub recurrence_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attendee_ids: Vec<Uuid>,
    #[serde(default)]
    pub reminders: Vec<CreateReminder>,
}

/// Reminder spec nested in event creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReminder {
    pub user_id: Uuid,
    pub minutes_before: i32,
    pub kind: ReminderKind,
}

/// Input for updating an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub color: Option<String>,
    pub event_type: Option<EventType>,
    pub recurrence_pattern: Option<Option<RecurrencePattern>>,
    pub recurrence_interval: Option<Option<i32>>,
    pub recurrence_end: Option<Option<DateTime<Utc>>>,
    /// When present, replaces the whole attendee set (RSVPs reset)
    pub attendee_ids: Option<Vec<Uuid>>,
}

const EVENT_COLUMNS: &str = "id, title, description, start_time, end_time, all_day, color, \
     event_type, task_id, project_id, department_id, user_id, is_recurring, \
     recurrence_pattern, recurrence_interval, recurrence_end, created_by, created_at, updated_at";

impl CalendarEvent {
    /// Creates an event with its attendees and reminders in one transaction
    ///
    /// The creator is recorded as an organizer attendee automatically.
    pub async fn create(
        pool: &PgPool,
        data: CreateEvent,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let event = sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"
            INSERT INTO calendar_events
                (title, description, start_time, end_time, all_day, color, event_type,
                 task_id, project_id, department_id, user_id,
                 is_recurring, recurrence_pattern, recurrence_interval, recurrence_end,
                 created_by)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, '#007bff'), $7,
                    $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.all_day)
        .bind(data.color)
        .bind(data.event_type)
        .bind(data.task_id)
        .bind(data.project_id)
        .bind(data.department_id)
        .bind(data.user_id)
        .bind(data.is_recurring)
        .bind(data.recurrence_pattern)
        .bind(data.recurrence_interval)
        .bind(data.recurrence_end)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO event_attendees (event_id, user_id, status, is_organizer)
            VALUES ($1, $2, 'accepted', TRUE)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(event.id)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        for attendee_id in &data.attendee_ids {
            sqlx::query(
                r#"
                INSERT INTO event_attendees (event_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(event.id)
            .bind(attendee_id)
            .execute(&mut *tx)
            .await?;
        }

        for reminder in &data.reminders {
            sqlx::query(
                r#"
                INSERT INTO event_reminders (event_id, user_id, minutes_before, kind)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(event.id)
            .bind(reminder.user_id)
            .bind(reminder.minutes_before)
            .bind(reminder.kind)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(event)
    }

    /// Finds an event by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's events overlapping a window
    ///
    /// "A user's events" means events they created or are invited to.
    /// Recurring events match when their series could still produce an
    /// occurrence in the window; the caller expands them.
    pub async fn list_for_user_in_window(
        pool: &PgPool,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"
            SELECT DISTINCT e.{cols}
            FROM calendar_events e
            LEFT JOIN event_attendees ea ON ea.event_id = e.id
            WHERE (e.created_by = $1 OR ea.user_id = $1)
              AND e.start_time < $3
              AND (
                    (NOT e.is_recurring AND e.end_time > $2)
                 OR (e.is_recurring AND (e.recurrence_end IS NULL OR e.recurrence_end > $2))
              )
            ORDER BY e.start_time
            "#,
            cols = EVENT_COLUMNS.replace(", ", ", e."),
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Updates an event; attendee set replaced wholesale when present
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateEvent,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query = String::from("UPDATE calendar_events SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.start_time.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_time = ${}", bind_count));
        }
        if data.end_time.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_time = ${}", bind_count));
        }
        if data.all_day.is_some() {
            bind_count += 1;
            query.push_str(&format!(", all_day = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }
        if data.event_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", event_type = ${}", bind_count));
        }
        if data.recurrence_pattern.is_some() {
            bind_count += 1;
            query.push_str(&format!(", recurrence_pattern = ${}", bind_count));
            query.push_str(&format!(
                ", is_recurring = (${} IS NOT NULL)",
                bind_count
            ));
        }
        if data.recurrence_interval.is_some() {
            bind_count += 1;
            query.push_str(&format!(", recurrence_interval = ${}", bind_count));
        }
        if data.recurrence_end.is_some() {
            bind_count += 1;
            query.push_str(&format!(", recurrence_end = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {EVENT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, CalendarEvent>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(start_time) = data.start_time {
            q = q.bind(start_time);
        }
        if let Some(end_time) = data.end_time {
            q = q.bind(end_time);
        }
        if let Some(all_day) = data.all_day {
            q = q.bind(all_day);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }
        if let Some(event_type) = data.event_type {
            q = q.bind(event_type);
        }
        if let Some(recurrence_pattern) = data.recurrence_pattern {
            q = q.bind(recurrence_pattern);
        }
        if let Some(recurrence_interval) = data.recurrence_interval {
            q = q.bind(recurrence_interval);
        }
        if let Some(recurrence_end) = data.recurrence_end {
            q = q.bind(recurrence_end);
        }

        let event = match q.fetch_optional(&mut *tx).await? {
            Some(event) => event,
            None => return Ok(None),
        };

        if let Some(attendee_ids) = data.attendee_ids {
            sqlx::query("DELETE FROM event_attendees WHERE event_id = $1 AND NOT is_organizer")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for attendee_id in attendee_ids {
                sqlx::query(
                    "INSERT INTO event_attendees (event_id, user_id) VALUES ($1, $2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(id)
                .bind(attendee_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(event))
    }

    /// Deletes an event (attendees and reminders cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts events a user created or attends
    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT e.id)
            FROM calendar_events e
            LEFT JOIN event_attendees ea ON ea.event_id = e.id
            WHERE e.created_by = $1 OR ea.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Lists an event's attendees
    pub async fn attendees(pool: &PgPool, event_id: Uuid) -> Result<Vec<EventAttendee>, sqlx::Error> {
        sqlx::query_as::<_, EventAttendee>(
            r#"
            SELECT ea.event_id, ea.user_id, u.full_name AS user_name,
                   ea.status, ea.is_organizer, ea.responded_at
            FROM event_attendees ea
            JOIN users u ON u.id = ea.user_id
            WHERE ea.event_id = $1
            ORDER BY ea.is_organizer DESC, u.full_name
            "#,
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// Records an attendee's RSVP
    pub async fn set_attendee_status(
        pool: &PgPool,
        event_id: Uuid,
        user_id: Uuid,
        status: AttendeeStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE event_attendees
            SET status = $3, responded_at = NOW()
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(status)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Creates deadline events for open tasks with due dates that have none
    ///
    /// Returns how many events were created. Idempotent: a task gets at
    /// most one deadline event.
    pub async fn sync_task_deadlines(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO calendar_events
                (title, start_time, end_time, event_type, task_id, project_id,
                 department_id, created_by)
            SELECT 'Deadline: ' || t.title,
                   t.due_date, t.due_date + INTERVAL '1 hour', 'deadline',
                   t.id, t.project_id, t.department_id, t.created_by
            FROM tasks t
            WHERE t.due_date IS NOT NULL
              AND t.status <> 'done'
              AND NOT EXISTS (
                  SELECT 1 FROM calendar_events e
                  WHERE e.task_id = t.id AND e.event_type = 'deadline'
              )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Creates milestone events for projects with end dates that have none
    pub async fn sync_project_milestones(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO calendar_events
                (title, start_time, end_time, event_type, project_id, created_by)
            SELECT 'Delivery: ' || p.name,
                   p.end_date, p.end_date + INTERVAL '1 hour', 'milestone',
                   p.id, NULL
            FROM projects p
            WHERE p.end_date IS NOT NULL
              AND NOT EXISTS (
                  SELECT 1 FROM calendar_events e
                  WHERE e.project_id = p.id AND e.event_type = 'milestone'
              )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

impl EventReminder {
    /// Lists active, unsent reminders whose fire time has arrived
    pub async fn list_due(pool: &PgPool) -> Result<Vec<DueReminder>, sqlx::Error> {
        sqlx::query_as::<_, DueReminder>(
            r#"
            SELECT r.id, r.event_id, r.user_id, r.minutes_before, r.kind,
                   e.title AS event_title, e.start_time AS event_start
            FROM event_reminders r
            JOIN calendar_events e ON e.id = r.event_id
            WHERE r.is_active
              AND r.sent_at IS NULL
              AND e.start_time - make_interval(mins => r.minutes_before) <= NOW()
              AND e.start_time > NOW()
            ORDER BY e.start_time
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Stamps a reminder as dispatched
    pub async fn mark_sent(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE event_reminders SET sent_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(
            serde_json::to_string(&EventType::Milestone).unwrap(),
            "\"milestone\""
        );
        assert_eq!(
            serde_json::to_string(&RecurrencePattern::Weekdays).unwrap(),
            "\"weekdays\""
        );
        assert_eq!(
            serde_json::to_string(&AttendeeStatus::Tentative).unwrap(),
            "\"tentative\""
        );
        assert_eq!(serde_json::to_string(&ReminderKind::Email).unwrap(), "\"email\"");
    }
}
