/// Middleware modules for the API server
///
/// - `security`: OWASP response headers
/// - `rate_limit`: in-memory sliding-window request limiting

pub mod rate_limit;
pub mod security;
