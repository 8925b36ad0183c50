/// Database models
///
/// One module per entity, each pairing the row struct with its query
/// functions on `PgPool`.
///
/// # Models
///
/// - `user`: accounts and the role enum driving authorization
/// - `department`: departments with guarded deletion
/// - `client`: client companies and their owner users
/// - `project`: projects with team-leader and department sets
/// - `task`: tasks, the status machine, and the review workflow
/// - `comment`: task comments
/// - `attachment`: task attachment metadata
/// - `notification`: per-user in-app notifications
/// - `calendar`: events, attendees, reminders
/// - `audit`: append-only audit log
/// - `login_attempt`: login attempt records driving lockout
/// - `reset_token`: password reset tokens (hash-at-rest)
/// - `reports`: read-only aggregates and cross-entity search

pub mod attachment;
pub mod audit;
pub mod calendar;
pub mod client;
pub mod comment;
pub mod department;
pub mod login_attempt;
pub mod notification;
pub mod project;
pub mod reports;
pub mod reset_token;
pub mod task;
pub mod user;
