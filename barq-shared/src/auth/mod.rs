/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: JWT token generation and validation (HS256, role claims)
/// - [`middleware`]: the `AuthContext` injected into requests
/// - [`authorization`]: role gates and data-visibility scoping
/// - [`reset`]: password-reset tokens (hash-at-rest) and login lockout
///
/// # Example
///
/// ```no_run
/// use barq_shared::auth::password::{hash_password, verify_password};
/// use barq_shared::auth::jwt::{create_token, Claims, TokenType};
/// use barq_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), UserRole::Employee, TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod reset;
