/// Calendar reminder dispatcher
///
/// Turns due reminders into notification rows and stamps them sent.
/// Email-kind reminders get the same in-app notification; actual mail
/// delivery is outside this service.

use barq_shared::models::{
    calendar::{DueReminder, EventReminder},
    notification::Notification,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Builds the reminder message for an event
pub fn reminder_message(title: &str, start: DateTime<Utc>) -> String {
    format!(
        "Reminder: '{}' starts at {}",
        title,
        start.format("%b %d, %Y %H:%M")
    )
}

/// Reminder dispatcher bound to a database pool
pub struct ReminderDispatcher {
    db: PgPool,
}

impl ReminderDispatcher {
    /// Creates a new dispatcher
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Dispatches every due reminder; returns how many were sent
    pub async fn run_once(&self) -> Result<usize, sqlx::Error> {
        let due = EventReminder::list_due(&self.db).await?;

        if due.is_empty() {
            return Ok(0);
        }

        let mut sent = 0;
        for reminder in due {
            self.dispatch(&reminder).await?;
            sent += 1;
        }

        tracing::info!(sent, "Dispatched calendar reminders");
        Ok(sent)
    }

    async fn dispatch(&self, reminder: &DueReminder) -> Result<(), sqlx::Error> {
        Notification::create(
            &self.db,
            reminder.user_id,
            &reminder_message(&reminder.event_title, reminder.event_start),
            None,
            None,
        )
        .await?;

        EventReminder::mark_sent(&self.db, reminder.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reminder_message() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).unwrap();
        let message = reminder_message("Sprint planning", start);

        assert!(message.contains("Sprint planning"));
        assert!(message.contains("Jun 01, 2025 14:30"));
    }
}
