/// Rate limiting middleware
///
/// Sliding-window limiter keyed by client identity plus endpoint class,
/// held in process memory. Auth endpoints get a tight limit (credential
/// stuffing), everything else a general one.
///
/// # Limits
///
/// - **Auth** (`/v1/auth/...`): 10 requests/minute
/// - **General**: 120 requests/minute
///
/// The client identity is taken from `X-Forwarded-For` / `X-Real-IP`
/// (set by the reverse proxy) and falls back to "unknown", which lumps
/// direct anonymous traffic into one shared bucket.
///
/// # Response
///
/// Over-limit requests get a 429 with a `Retry-After` header.

use axum::{extract::Request, middleware::Next, response::Response};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// Window length for both endpoint classes
const WINDOW: Duration = Duration::from_secs(60);

/// Requests allowed per window on auth endpoints
const AUTH_LIMIT: usize = 10;

/// Requests allowed per window elsewhere
const GENERAL_LIMIT: usize = 120;

/// Global sweep threshold; beyond this many keys, drained buckets are dropped
const SWEEP_THRESHOLD: usize = 10_000;

fn buckets() -> &'static Mutex<HashMap<String, Vec<Instant>>> {
    static BUCKETS: OnceLock<Mutex<HashMap<String, Vec<Instant>>>> = OnceLock::new();
    BUCKETS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn client_identity(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.to_string();
    }

    "unknown".to_string()
}

fn limit_for_path(path: &str) -> usize {
    if path.starts_with("/v1/auth/") {
        AUTH_LIMIT
    } else {
        GENERAL_LIMIT
    }
}

/// Checks and records one request; true means allowed
fn check_and_record(key: String, limit: usize, now: Instant) -> bool {
    let mut map = buckets().lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    if map.len() > SWEEP_THRESHOLD {
        map.retain(|_, hits| hits.iter().any(|t| now.duration_since(*t) < WINDOW));
    }

    let hits = map.entry(key).or_default();
    hits.retain(|t| now.duration_since(*t) < WINDOW);

    if hits.len() >= limit {
        return false;
    }

    hits.push(now);
    true
}

/// Rate limiting middleware function
pub async fn rate_limit_layer(req: Request, next: Next) -> Result<Response, ApiError> {
    let client = client_identity(&req);
    let path = req.uri().path().to_string();
    let limit = limit_for_path(&path);
    let key = format!("{}:{}", client, limit);

    if !check_and_record(key, limit, Instant::now()) {
        tracing::warn!(client = %client, path = %path, "Rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            retry_after: WINDOW.as_secs(),
            message: "Rate limit exceeded. Please try again later.".to_string(),
        });
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_classes() {
        assert_eq!(limit_for_path("/v1/auth/login"), AUTH_LIMIT);
        assert_eq!(limit_for_path("/v1/auth/register"), AUTH_LIMIT);
        assert_eq!(limit_for_path("/v1/tasks"), GENERAL_LIMIT);
        assert_eq!(limit_for_path("/health"), GENERAL_LIMIT);
    }

    #[test]
    fn test_window_enforced() {
        let now = Instant::now();
        let key = "test-client:window".to_string();

        for _ in 0..5 {
            assert!(check_and_record(key.clone(), 5, now));
        }
        assert!(!check_and_record(key.clone(), 5, now));

        // A fresh window lets requests through again
        let later = now + WINDOW + Duration::from_secs(1);
        assert!(check_and_record(key, 5, later));
    }

    #[test]
    fn test_distinct_clients_do_not_interfere() {
        let now = Instant::now();
        assert!(check_and_record("client-a:distinct".to_string(), 1, now));
        assert!(check_and_record("client-b:distinct".to_string(), 1, now));
        assert!(!check_and_record("client-a:distinct".to_string(), 1, now));
    }
}
