/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts. Every user carries exactly one role; the role drives both
/// endpoint-level authorization and data visibility (see `auth::authorization`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM (
///     'manager', 'assistant_manager', 'account_manager',
///     'team_leader', 'employee', 'client'
/// );
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     full_name VARCHAR(100) NOT NULL,
///     phone VARCHAR(30),
///     position VARCHAR(100),
///     role user_role NOT NULL,
///     team_leader_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     department_id UUID REFERENCES departments(id) ON DELETE SET NULL,
///     client_id UUID REFERENCES clients(id) ON DELETE SET NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use barq_shared::models::user::{User, CreateUser, UserRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "amal.k".to_string(),
///     email: "amal@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     full_name: "Amal K".to_string(),
///     phone: None,
///     position: Some("Designer".to_string()),
///     role: UserRole::Employee,
///     team_leader_id: None,
///     department_id: None,
///     client_id: None,
/// }).await?;
///
/// let found = User::find_by_username(&pool, "amal.k").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Roles a user account can hold
///
/// - **Manager / AssistantManager**: run the organization, manage users,
///   see everything.
/// - **AccountManager**: mediates between internal work and external
///   client approval; can pass tasks between users.
/// - **TeamLeader**: supervises employees within a department.
/// - **Employee**: works on assigned tasks.
/// - **Client**: external; sees only their own company's projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Manager,
    AssistantManager,
    AccountManager,
    TeamLeader,
    Employee,
    Client,
}

impl UserRole {
    /// Converts role to string for display and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Manager => "manager",
            UserRole::AssistantManager => "assistant_manager",
            UserRole::AccountManager => "account_manager",
            UserRole::TeamLeader => "team_leader",
            UserRole::Employee => "employee",
            UserRole::Client => "client",
        }
    }

    /// Management roles run user administration
    pub fn can_manage_users(&self) -> bool {
        matches!(self, UserRole::Manager | UserRole::AssistantManager)
    }

    /// Roles that read the full task/project set without a visibility filter
    pub fn has_unscoped_read(&self) -> bool {
        matches!(
            self,
            UserRole::Manager | UserRole::AssistantManager | UserRole::AccountManager
        )
    }

    /// Roles allowed to pass (reassign) a task to another user
    pub fn can_pass_tasks(&self) -> bool {
        matches!(self, UserRole::AccountManager | UserRole::TeamLeader)
    }

    /// Roles allowed to extend an overdue task's deadline
    pub fn can_extend_deadlines(&self) -> bool {
        matches!(
            self,
            UserRole::Manager | UserRole::AssistantManager | UserRole::TeamLeader
        )
    }

    /// Roles that may be set as a project team leader
    pub fn can_lead_projects(&self) -> bool {
        matches!(self, UserRole::TeamLeader)
    }

    /// Internal staff (everyone except external clients)
    pub fn is_internal(&self) -> bool {
        !matches!(self, UserRole::Client)
    }

    /// Managers and assistant managers may only hand work to team leaders
    /// and employees, never to each other.
    pub fn assignable_by_management(&self) -> bool {
        matches!(self, UserRole::TeamLeader | UserRole::Employee)
    }
}

/// User model representing one account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique across all users
    pub username: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash, never plaintext
    pub password_hash: String,

    /// Display name
    pub full_name: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Optional job title
    pub position: Option<String>,

    /// Role driving authorization
    pub role: UserRole,

    /// Supervising team leader (employees only)
    pub team_leader_id: Option<Uuid>,

    /// Department membership
    pub department_id: Option<Uuid>,

    /// Owning client company (client-role users only)
    pub client_id: Option<Uuid>,

    /// Inactive accounts cannot log in
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    /// Argon2id hash (NOT the plaintext password)
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub role: UserRole,
    pub team_leader_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// Input for updating an existing user
///
/// All fields are optional; only present fields are written.
/// Nullable columns use `Some(None)` to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub position: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub team_leader_id: Option<Option<Uuid>>,
    pub department_id: Option<Option<Uuid>>,
    pub client_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, phone, position, role, \
     team_leader_id, department_id, client_id, is_active, created_at, updated_at, last_login_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email is already taken (unique
    /// constraint) or a referenced team leader / department / client does
    /// not exist (foreign key violation).
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, phone, position,
                               role, team_leader_id, department_id, client_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.full_name)
        .bind(data.phone)
        .bind(data.position)
        .bind(data.role)
        .bind(data.team_leader_id)
        .bind(data.department_id)
        .bind(data.client_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by login name
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Lists users ordered by creation date (newest first)
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Lists active users holding any of the given roles
    ///
    /// Used by the overdue-task worker to fan notifications out to
    /// managers and assistant managers.
    pub async fn list_active_by_roles(
        pool: &PgPool,
        roles: &[UserRole],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active AND role = ANY($1) ORDER BY full_name"
        ))
        .bind(roles)
        .fetch_all(pool)
        .await
    }

    /// Updates an existing user
    ///
    /// Only non-None fields are written; `updated_at` is always refreshed.
    /// Returns None if the user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.full_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", full_name = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.position.is_some() {
            bind_count += 1;
            query.push_str(&format!(", position = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.team_leader_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", team_leader_id = ${}", bind_count));
        }
        if data.department_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", department_id = ${}", bind_count));
        }
        if data.client_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", client_id = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(full_name) = data.full_name {
            q = q.bind(full_name);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(position) = data.position {
            q = q.bind(position);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(team_leader_id) = data.team_leader_id {
            q = q.bind(team_leader_id);
        }
        if let Some(department_id) = data.department_id {
            q = q.bind(department_id);
        }
        if let Some(client_id) = data.client_id {
            q = q.bind(client_id);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a user by ID
    ///
    /// Returns true if a row was removed. Tasks created by or assigned to
    /// the user keep their rows; the user references are nulled by the
    /// schema's ON DELETE SET NULL.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps the last-login timestamp after successful authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks a user exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(found)
    }

    /// Counts all users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(UserRole::Manager.as_str(), "manager");
        assert_eq!(UserRole::AssistantManager.as_str(), "assistant_manager");
        assert_eq!(UserRole::AccountManager.as_str(), "account_manager");
        assert_eq!(UserRole::TeamLeader.as_str(), "team_leader");
        assert_eq!(UserRole::Employee.as_str(), "employee");
        assert_eq!(UserRole::Client.as_str(), "client");
    }

    #[test]
    fn test_role_user_management() {
        assert!(UserRole::Manager.can_manage_users());
        assert!(UserRole::AssistantManager.can_manage_users());
        assert!(!UserRole::AccountManager.can_manage_users());
        assert!(!UserRole::TeamLeader.can_manage_users());
        assert!(!UserRole::Employee.can_manage_users());
        assert!(!UserRole::Client.can_manage_users());
    }

    #[test]
    fn test_role_unscoped_read() {
        assert!(UserRole::Manager.has_unscoped_read());
        assert!(UserRole::AssistantManager.has_unscoped_read());
        assert!(UserRole::AccountManager.has_unscoped_read());
        assert!(!UserRole::TeamLeader.has_unscoped_read());
        assert!(!UserRole::Employee.has_unscoped_read());
        assert!(!UserRole::Client.has_unscoped_read());
    }

    #[test]
    fn test_role_task_workflow_powers() {
        assert!(UserRole::AccountManager.can_pass_tasks());
        assert!(UserRole::TeamLeader.can_pass_tasks());
        assert!(!UserRole::Manager.can_pass_tasks());

        assert!(UserRole::Manager.can_extend_deadlines());
        assert!(UserRole::AssistantManager.can_extend_deadlines());
        assert!(UserRole::TeamLeader.can_extend_deadlines());
        assert!(!UserRole::Employee.can_extend_deadlines());
    }

    #[test]
    fn test_management_assignment_restriction() {
        // Managers may only hand work to team leaders and employees
        assert!(UserRole::TeamLeader.assignable_by_management());
        assert!(UserRole::Employee.assignable_by_management());
        assert!(!UserRole::Manager.assignable_by_management());
        assert!(!UserRole::AssistantManager.assignable_by_management());
        assert!(!UserRole::AccountManager.assignable_by_management());
        assert!(!UserRole::Client.assignable_by_management());
    }

    #[test]
    fn test_only_team_leaders_lead_projects() {
        assert!(UserRole::TeamLeader.can_lead_projects());
        assert!(!UserRole::Manager.can_lead_projects());
        assert!(!UserRole::Employee.can_lead_projects());
    }

    #[test]
    fn test_update_user_default_is_empty() {
        let update = UpdateUser::default();
        assert!(update.username.is_none());
        assert!(update.email.is_none());
        assert!(update.role.is_none());
        assert!(update.team_leader_id.is_none());
        assert!(update.is_active.is_none());
    }
}
