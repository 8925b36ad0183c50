/// Password reset tokens and login lockout
///
/// Reset tokens are 32 random bytes, handed out once in hex and stored
/// only as a SHA-256 hash, so a database leak exposes nothing usable.
/// Tokens are single-use and expire after [`RESET_TOKEN_TTL_HOURS`].
///
/// Lockout: an account with [`MAX_FAILED_LOGINS`] failed attempts inside
/// the trailing [`LOCKOUT_WINDOW_MINUTES`] is refused until the window
/// drains. Successful logins are recorded too, but only failures count.

use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::login_attempt::LoginAttempt;
use crate::models::reset_token::PasswordResetToken;

/// How long a reset token stays valid
pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

/// Failed logins tolerated inside the lockout window
pub const MAX_FAILED_LOGINS: i64 = 5;

/// Trailing window for counting failed logins
pub const LOCKOUT_WINDOW_MINUTES: i64 = 30;

/// Generates a fresh reset token (hex, 64 chars)
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hashes a token for storage or lookup
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issues a reset token for a user
///
/// Stores the hash and returns the plaintext token, the only time it
/// ever exists outside the caller's hands.
pub async fn issue_reset_token(pool: &PgPool, user_id: Uuid) -> Result<String, sqlx::Error> {
    let token = generate_reset_token();
    let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

    PasswordResetToken::create(pool, user_id, &hash_reset_token(&token), expires_at).await?;

    Ok(token)
}

/// Consumes a reset token, returning the owning user
///
/// Returns None for unknown, expired or already-used tokens. A returned
/// token is marked used before this resolves, so it cannot be replayed.
pub async fn consume_reset_token(pool: &PgPool, token: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let stored = match PasswordResetToken::find_live_by_hash(pool, &hash_reset_token(token)).await? {
        Some(stored) => stored,
        None => return Ok(None),
    };

    PasswordResetToken::mark_used(pool, stored.id).await?;

    Ok(Some(stored.user_id))
}

/// Checks whether a username is currently locked out
pub async fn is_account_locked(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    let failed = LoginAttempt::failed_count_since(
        pool,
        username,
        Duration::minutes(LOCKOUT_WINDOW_MINUTES),
    )
    .await?;

    Ok(failed >= MAX_FAILED_LOGINS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn test_hash_is_stable_and_distinct() {
        let token = generate_reset_token();
        assert_eq!(hash_reset_token(&token), hash_reset_token(&token));
        assert_ne!(hash_reset_token(&token), token);
        assert_eq!(hash_reset_token(&token).len(), 64);
    }
}
