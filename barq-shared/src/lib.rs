//! # Barq Shared Library
//!
//! Shared types and business logic used by the Barq API server and
//! background worker.
//!
//! ## Module Organization
//!
//! - `models`: database models and query functions
//! - `auth`: authentication (JWT, Argon2id) and authorization (roles,
//!   visibility scoping)
//! - `db`: connection pool and migration runner
//! - `recurrence`: pure expansion of recurring calendar events

pub mod auth;
pub mod db;
pub mod models;
pub mod recurrence;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
