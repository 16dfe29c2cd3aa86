//! Structured logging helpers.
//!
//! Every request gets a UUID v7 request id from the `SetRequestIdLayer`
//! stack in `main`; the id is recorded on the request span so all events
//! emitted while handling that request carry it. The helpers below emit one
//! structured event per call and never include credentials or user content.

use axum::http::HeaderMap;

pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Header names whose values must never reach the log stream.
const SENSITIVE_HEADERS: [&str; 4] = ["authorization", "cookie", "x-api-key", "apikey"];

/// Render headers as a JSON object with sensitive values replaced by a
/// fixed placeholder.
pub fn redact_headers(headers: &HeaderMap) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (name, value) in headers {
        let name_str = name.as_str();
        let rendered = if SENSITIVE_HEADERS.contains(&name_str) {
            REDACTED_PLACEHOLDER.to_string()
        } else {
            value.to_str().unwrap_or("<binary>").to_string()
        };
        map.insert(name_str.to_string(), serde_json::Value::String(rendered));
    }
    serde_json::Value::Object(map)
}

/// Log an authentication attempt outcome.
pub fn log_auth(success: bool, user_id: Option<&str>, error: Option<&str>) {
    if success {
        tracing::info!(user_id = user_id.unwrap_or("-"), "Authentication successful");
    } else {
        tracing::warn!(
            user_id = user_id.unwrap_or("-"),
            error = error.unwrap_or("Unknown error"),
            "Authentication failed"
        );
    }
}

/// Log a rate-limit check. Denials are warnings; allowed checks are debug
/// noise and stay hidden unless debug mode is on.
pub fn log_rate_limit(user_id: &str, allowed: bool, limit: u32, count: u32) {
    if allowed {
        tracing::debug!(user_id, limit, count, allowed, "Rate limit check");
    } else {
        tracing::warn!(user_id, limit, count, allowed, "Rate limit exceeded");
    }
}

/// Log an outbound call to an upstream service with its measured duration.
pub fn log_external_api(
    service: &str,
    endpoint: &str,
    success: bool,
    duration_ms: u64,
    error: Option<&str>,
) {
    if success {
        tracing::info!(service, endpoint, duration_ms, "External API call succeeded");
    } else {
        tracing::error!(
            service,
            endpoint,
            duration_ms,
            error = error.unwrap_or("Unknown error"),
            "External API call failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};

    #[test]
    fn redacts_sensitive_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer secret-token".parse().unwrap());
        headers.insert(COOKIE, "session=abc".parse().unwrap());
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        headers.insert("x-api-key", "sk-123".parse().unwrap());

        let redacted = redact_headers(&headers);
        assert_eq!(redacted["authorization"], REDACTED_PLACEHOLDER);
        assert_eq!(redacted["cookie"], REDACTED_PLACEHOLDER);
        assert_eq!(redacted["x-api-key"], REDACTED_PLACEHOLDER);
        assert_eq!(redacted["content-type"], "application/json");
    }

    #[test]
    fn passes_through_regular_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "0190-abc".parse().unwrap());
        let redacted = redact_headers(&headers);
        assert_eq!(redacted["x-request-id"], "0190-abc");
    }
}
