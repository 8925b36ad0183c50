/// Client (company) model and database operations
///
/// A client is an external company that owns projects. Every client has an
/// owner user (a `client`-role account used to log into the dashboard) and
/// optionally an account manager mediating approvals.
///
/// Creating a client can provision the owner user in the same transaction,
/// so a half-created company never exists without its login.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE clients (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     email VARCHAR(255),
///     phone VARCHAR(30),
///     address VARCHAR(200),
///     owner_user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     account_manager_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::{CreateUser, User};

/// Client company model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Client-role user who logs in on behalf of this company
    pub owner_user_id: Option<Uuid>,
    /// Account manager handling this company
    pub account_manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client with joined names and project count, for list views
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub owner_user_id: Option<Uuid>,
    pub owner_name: Option<String>,
    pub account_manager_id: Option<Uuid>,
    pub account_manager_name: Option<String>,
    pub project_count: i64,
}

/// Input for creating a client company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Existing user to use as owner; when None, callers pass `owner` to
    /// [`Client::create_with_owner`] instead
    pub owner_user_id: Option<Uuid>,
    pub account_manager_id: Option<Uuid>,
}

/// Input for updating a client company
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub account_manager_id: Option<Option<Uuid>>,
}

const CLIENT_COLUMNS: &str =
    "id, name, email, phone, address, owner_user_id, account_manager_id, created_at, updated_at";

const SUMMARY_QUERY: &str = r#"
    SELECT c.id, c.name, c.email, c.phone, c.address,
           c.owner_user_id, o.full_name AS owner_name,
           c.account_manager_id, am.full_name AS account_manager_name,
           (SELECT COUNT(*) FROM projects p WHERE p.client_id = c.id) AS project_count
    FROM clients c
    LEFT JOIN users o ON o.id = c.owner_user_id
    LEFT JOIN users am ON am.id = c.account_manager_id
"#;

impl Client {
    /// Creates a client, optionally provisioning its owner user in the
    /// same transaction
    ///
    /// When `owner` is given, the user row is inserted first (role must be
    /// `client`), the company is created pointing at it, and the user's
    /// `client_id` back-reference is filled in before commit.
    pub async fn create_with_owner(
        pool: &PgPool,
        data: CreateClient,
        owner: Option<CreateUser>,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owner_user_id = match (data.owner_user_id, owner) {
            (Some(existing), _) => Some(existing),
            (None, Some(new_owner)) => {
                let user = sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (username, email, password_hash, full_name, phone,
                                       position, role, team_leader_id, department_id, client_id)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    RETURNING id, username, email, password_hash, full_name, phone, position,
                              role, team_leader_id, department_id, client_id, is_active,
                              created_at, updated_at, last_login_at
                    "#,
                )
                .bind(new_owner.username)
                .bind(new_owner.email)
                .bind(new_owner.password_hash)
                .bind(new_owner.full_name)
                .bind(new_owner.phone)
                .bind(new_owner.position)
                .bind(new_owner.role)
                .bind(new_owner.team_leader_id)
                .bind(new_owner.department_id)
                .bind(new_owner.client_id)
                .fetch_one(&mut *tx)
                .await?;
                Some(user.id)
            }
            (None, None) => None,
        };

        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (name, email, phone, address, owner_user_id, account_manager_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLIENT_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.address)
        .bind(owner_user_id)
        .bind(data.account_manager_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(owner_id) = owner_user_id {
            sqlx::query("UPDATE users SET client_id = $2 WHERE id = $1")
                .bind(owner_id)
                .bind(client.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(client)
    }

    /// Finds a client by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a client summary (joined names, project count) by ID
    pub async fn find_summary(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ClientSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClientSummary>(&format!("{SUMMARY_QUERY} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists all clients with joined names and project counts
    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<ClientSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClientSummary>(&format!("{SUMMARY_QUERY} ORDER BY c.name"))
            .fetch_all(pool)
            .await
    }

    /// Updates a client's contact fields and account manager
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateClient,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE clients SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.account_manager_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", account_manager_id = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {CLIENT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Client>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }
        if let Some(account_manager_id) = data.account_manager_id {
            q = q.bind(account_manager_id);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a client by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks a client exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM clients WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_client_default_is_empty() {
        let update = UpdateClient::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.account_manager_id.is_none());
    }
}
