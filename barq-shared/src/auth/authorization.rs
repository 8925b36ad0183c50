/// Authorization helpers and visibility scoping
///
/// Role checks here are shared by every route module so the rules live in
/// one place instead of being restated per endpoint:
///
/// 1. **Endpoint gates**: [`require_role`] / [`require_any_role`] reject
///    callers whose role is not in the allowed set.
/// 2. **Data visibility**: [`task_scope`] maps a caller to the slice of
///    tasks they may see (employees: own, team leaders: department,
///    clients: their company, management: everything).
/// 3. **Workflow eligibility**: [`can_review_task`] answers whether a
///    caller may approve or reject a task's completion request.
///
/// # Example
///
/// ```no_run
/// use barq_shared::auth::authorization::{require_any_role, task_scope};
/// use barq_shared::auth::middleware::AuthContext;
/// use barq_shared::models::task::Task;
/// use barq_shared::models::user::UserRole;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, auth: AuthContext) -> Result<(), Box<dyn std::error::Error>> {
/// require_any_role(&auth, &[UserRole::Manager, UserRole::AssistantManager])?;
///
/// let scope = task_scope(&pool, &auth).await?;
/// let visible = Task::list(&pool, scope).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::task::{Task, TaskScope};
use crate::models::user::{User, UserRole};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is not allowed here
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole {
        required: String,
        actual: &'static str,
    },

    /// Caller may not touch this particular resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,

    /// Caller's account row disappeared mid-request
    #[error("Account not found")]
    AccountMissing,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Requires the caller to hold exactly `role`
pub fn require_role(auth: &AuthContext, role: UserRole) -> Result<(), AuthzError> {
    require_any_role(auth, &[role])
}

/// Requires the caller's role to be one of `allowed`
pub fn require_any_role(auth: &AuthContext, allowed: &[UserRole]) -> Result<(), AuthzError> {
    if allowed.contains(&auth.role) {
        return Ok(());
    }

    Err(AuthzError::InsufficientRole {
        required: allowed
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join("|"),
        actual: auth.role.as_str(),
    })
}

/// Requires a role allowed to administer user accounts
pub fn require_user_management(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.role.can_manage_users() {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            required: "manager|assistant_manager".to_string(),
            actual: auth.role.as_str(),
        })
    }
}

/// Maps the caller to their task visibility scope
///
/// Needs the caller's user row for department/company linkage; a missing
/// row (account deleted while the token was still valid) is an error.
pub async fn task_scope(pool: &PgPool, auth: &AuthContext) -> Result<TaskScope, AuthzError> {
    if auth.role.has_unscoped_read() {
        return Ok(TaskScope::All);
    }

    let user = User::find_by_id(pool, auth.user_id)
        .await?
        .ok_or(AuthzError::AccountMissing)?;

    let scope = match auth.role {
        UserRole::Employee => TaskScope::AssignedTo(auth.user_id),
        UserRole::TeamLeader => match user.department_id {
            Some(department_id) => TaskScope::Department(department_id),
            None => TaskScope::AssignedTo(auth.user_id),
        },
        UserRole::Client => match user.client_id {
            Some(client_id) => TaskScope::Client(client_id),
            None => TaskScope::Nothing,
        },
        // has_unscoped_read covered these above
        UserRole::Manager | UserRole::AssistantManager | UserRole::AccountManager => TaskScope::All,
    };

    Ok(scope)
}

/// Checks whether the caller may review a task's completion request
///
/// Reviewers are the task's creator, whoever delegated it, or the
/// assignee's team leader.
pub async fn can_review_task(
    pool: &PgPool,
    auth: &AuthContext,
    task: &Task,
) -> Result<bool, AuthzError> {
    if task.created_by == Some(auth.user_id) || task.delegated_by == Some(auth.user_id) {
        return Ok(true);
    }

    if let Some(assignee_id) = task.assigned_to {
        if let Some(assignee) = User::find_by_id(pool, assignee_id).await? {
            if assignee.team_leader_id == Some(auth.user_id) {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Checks whether the caller is the client allowed to approve a task
///
/// Client review is restricted to client-role users whose company owns
/// the task's project.
pub async fn can_client_review(
    pool: &PgPool,
    auth: &AuthContext,
    project_client_id: Uuid,
) -> Result<bool, AuthzError> {
    if auth.role != UserRole::Client {
        return Ok(false);
    }

    let user = User::find_by_id(pool, auth.user_id)
        .await?
        .ok_or(AuthzError::AccountMissing)?;

    Ok(user.client_id == Some(project_client_id))
}

/// Enforces the management assignment restriction
///
/// Managers and assistant managers may only assign work to team leaders
/// and employees.
pub fn check_assignment_allowed(
    assigner_role: UserRole,
    assignee_role: UserRole,
) -> Result<(), AuthzError> {
    if assigner_role.can_manage_users() && !assignee_role.assignable_by_management() {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_require_any_role() {
        let auth = ctx(UserRole::TeamLeader);

        assert!(require_any_role(&auth, &[UserRole::TeamLeader]).is_ok());
        assert!(
            require_any_role(&auth, &[UserRole::Manager, UserRole::TeamLeader]).is_ok()
        );
        assert!(require_any_role(&auth, &[UserRole::Manager]).is_err());
    }

    #[test]
    fn test_require_user_management() {
        assert!(require_user_management(&ctx(UserRole::Manager)).is_ok());
        assert!(require_user_management(&ctx(UserRole::AssistantManager)).is_ok());
        assert!(require_user_management(&ctx(UserRole::Employee)).is_err());
        assert!(require_user_management(&ctx(UserRole::Client)).is_err());
    }

    #[test]
    fn test_assignment_restriction() {
        // Management can assign downward only
        assert!(check_assignment_allowed(UserRole::Manager, UserRole::Employee).is_ok());
        assert!(check_assignment_allowed(UserRole::Manager, UserRole::TeamLeader).is_ok());
        assert!(check_assignment_allowed(UserRole::Manager, UserRole::AssistantManager).is_err());
        assert!(check_assignment_allowed(UserRole::AssistantManager, UserRole::Manager).is_err());

        // Non-management assigners are unrestricted
        assert!(check_assignment_allowed(UserRole::AccountManager, UserRole::AccountManager).is_ok());
        assert!(check_assignment_allowed(UserRole::TeamLeader, UserRole::Employee).is_ok());
    }

    #[test]
    fn test_insufficient_role_message_names_both_sides() {
        let err = require_any_role(&ctx(UserRole::Client), &[UserRole::Manager]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("manager"));
        assert!(message.contains("client"));
    }
}
