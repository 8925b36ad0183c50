/// Integration tests for the authentication flow
///
/// Walks the credential lifecycle the way the API does: strength check,
/// Argon2id hash, verification, token issuance, middleware context, and
/// refresh rotation. Also covers the reset-token hash-at-rest scheme.

use barq_shared::auth::jwt::{
    create_token, refresh_access_token, validate_access_token, validate_refresh_token, Claims,
    TokenType,
};
use barq_shared::auth::middleware::AuthContext;
use barq_shared::auth::password::{hash_password, validate_password_strength, verify_password};
use barq_shared::auth::reset::{generate_reset_token, hash_reset_token};
use barq_shared::models::user::UserRole;
use uuid::Uuid;

const SECRET: &str = "auth-flow-test-secret-0123456789abcdef";

/// Register-then-login: strength check, hash, verify, token issuance
#[test]
fn test_credential_lifecycle() {
    let password = "Corr3ct!Horse";
    validate_password_strength(password).unwrap();

    let stored_hash = hash_password(password).unwrap();
    assert!(stored_hash.starts_with("$argon2id$"));

    // Login succeeds with the right password, fails with a near miss
    assert!(verify_password(password, &stored_hash).unwrap());
    assert!(!verify_password("Corr3ct!horse", &stored_hash).unwrap());

    let user_id = Uuid::new_v4();
    let access = create_token(
        &Claims::new(user_id, UserRole::TeamLeader, TokenType::Access),
        SECRET,
    )
    .unwrap();

    // The middleware sees the same identity the login issued
    let claims = validate_access_token(&access, SECRET).unwrap();
    let ctx = AuthContext::from_claims(&claims);
    assert_eq!(ctx.user_id, user_id);
    assert_eq!(ctx.role, UserRole::TeamLeader);
}

/// Refresh rotation preserves identity and role
#[test]
fn test_refresh_rotation() {
    let user_id = Uuid::new_v4();
    let refresh = create_token(
        &Claims::new(user_id, UserRole::AccountManager, TokenType::Refresh),
        SECRET,
    )
    .unwrap();

    // The refresh token itself never passes as an access token
    assert!(validate_access_token(&refresh, SECRET).is_err());
    assert!(validate_refresh_token(&refresh, SECRET).is_ok());

    let rotated = refresh_access_token(&refresh, SECRET).unwrap();
    let claims = validate_access_token(&rotated, SECRET).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.role, UserRole::AccountManager);
}

/// Tokens signed under one secret are worthless under another
#[test]
fn test_tokens_bound_to_secret() {
    let token = create_token(
        &Claims::new(Uuid::new_v4(), UserRole::Employee, TokenType::Access),
        SECRET,
    )
    .unwrap();

    assert!(validate_access_token(&token, "another-secret-0123456789abcdefgh").is_err());
}

/// Reset tokens: random, hex, and stored only as a stable hash
#[test]
fn test_reset_token_hash_at_rest() {
    let token = generate_reset_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    let hash = hash_reset_token(&token);
    assert_ne!(hash, token);
    assert_eq!(hash, hash_reset_token(&token));

    // A lookup with the wrong token can never match the stored hash
    let other = generate_reset_token();
    assert_ne!(hash_reset_token(&other), hash);
}

/// Weak passwords are refused before anything is hashed
#[test]
fn test_weak_passwords_refused() {
    for weak in ["", "Sh0rt!", "alllowercase1!", "ALLUPPERCASE1!", "NoDigits!!"] {
        assert!(validate_password_strength(weak).is_err(), "{:?}", weak);
    }

    // Exactly 8 characters with all four classes is the floor
    assert!(validate_password_strength("Short1!A").is_ok());
}
