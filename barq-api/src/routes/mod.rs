/// API route handlers
///
/// One module per resource:
///
/// - `health`: liveness check
/// - `auth`: login, registration, token refresh, password reset
/// - `users`: user administration
/// - `departments`: department CRUD with guarded deletion
/// - `clients`: client companies
/// - `projects`: project CRUD with member sets
/// - `tasks`: task CRUD plus the review workflow
/// - `notifications`: per-user notifications
/// - `calendar`: events, RSVP, recurrence expansion, sync
/// - `reports`: read-only aggregates
/// - `search`: cross-entity search
/// - `audit_logs`: audit trail queries

pub mod audit_logs;
pub mod auth;
pub mod calendar;
pub mod clients;
pub mod departments;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod reports;
pub mod search;
pub mod tasks;
pub mod users;
