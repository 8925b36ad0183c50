/// Overdue-task scanner
///
/// Scans for open tasks whose due date has passed and fans notifications
/// out to the assignee, the assignee's team leader, and every active
/// manager/assistant manager. The scan runs hourly but each recipient is
/// nagged at most once per day per task.

use barq_shared::models::{
    notification::Notification,
    task::Task,
    user::{User, UserRole},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Result of one scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Overdue tasks found
    pub tasks_scanned: usize,

    /// Notification rows written
    pub notifications_created: usize,
}

/// Builds the overdue message for a task
pub fn overdue_message(title: &str, due_date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days_overdue = (now - due_date).num_days().max(0);
    format!(
        "Task '{}' is overdue by {} day(s). Due date was {}.",
        title,
        days_overdue,
        due_date.format("%b %d, %Y")
    )
}

/// Overdue-task scanner bound to a database pool
pub struct OverdueScanner {
    db: PgPool,
}

impl OverdueScanner {
    /// Creates a new scanner
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Runs one scan pass
    pub async fn run_once(&self) -> Result<ScanOutcome, sqlx::Error> {
        let now = Utc::now();
        let overdue = Task::list_overdue(&self.db).await?;

        if overdue.is_empty() {
            tracing::debug!("No overdue tasks found");
            return Ok(ScanOutcome::default());
        }

        tracing::info!(count = overdue.len(), "Found overdue tasks");

        let managers =
            User::list_active_by_roles(&self.db, &[UserRole::Manager, UserRole::AssistantManager])
                .await?;

        let mut outcome = ScanOutcome {
            tasks_scanned: overdue.len(),
            notifications_created: 0,
        };

        for task in &overdue {
            let due_date = match task.due_date {
                Some(due_date) => due_date,
                None => continue,
            };
            let message = overdue_message(&task.title, due_date, now);

            let mut recipients: Vec<(Uuid, String)> = Vec::new();

            if let Some(assignee_id) = task.assigned_to {
                recipients.push((assignee_id, message.clone()));

                if let Some(assignee) = User::find_by_id(&self.db, assignee_id).await? {
                    if let Some(team_leader_id) = assignee.team_leader_id {
                        recipients.push((
                            team_leader_id,
                            format!("Team member's task is overdue: {}", message),
                        ));
                    }
                }
            }

            for manager in &managers {
                recipients.push((
                    manager.id,
                    format!("Overdue task requires attention: {}", message),
                ));
            }

            recipients.sort_by_key(|(id, _)| *id);
            recipients.dedup_by_key(|(id, _)| *id);

            for (user_id, message) in recipients {
                if Notification::overdue_notice_sent_today(&self.db, user_id, task.id).await? {
                    continue;
                }

                Notification::create(
                    &self.db,
                    user_id,
                    &message,
                    Some(task.id),
                    Some(task.project_id),
                )
                .await?;
                outcome.notifications_created += 1;
            }
        }

        tracing::info!(
            tasks = outcome.tasks_scanned,
            notifications = outcome.notifications_created,
            "Overdue scan complete"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_overdue_message_counts_days() {
        let due = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 13, 12, 0, 0).unwrap();

        let message = overdue_message("Design review", due, now);
        assert!(message.contains("Design review"));
        assert!(message.contains("overdue by 3 day(s)"));
        assert!(message.contains("Mar 10, 2025"));
    }

    #[test]
    fn test_overdue_message_never_negative() {
        let due = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 13, 0, 0).unwrap();

        let message = overdue_message("T", due, now);
        assert!(message.contains("overdue by 0 day(s)"));
    }
}
