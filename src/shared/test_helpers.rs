#[cfg(test)]
use crate::features::auth::model::{AuthenticatedUser, SessionToken};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: "user-test-1".to_string(),
        email: Some("dev@example.com".to_string()),
    }
}

#[cfg(test)]
async fn inject_test_session_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(test_user());
    request
        .extensions_mut()
        .insert(SessionToken::new("test-session-token"));
    next.run(request).await
}

/// Wrap a router so handlers see an already-authenticated session, skipping
/// the identity-service round trip.
#[cfg(test)]
pub fn with_test_session(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_session_middleware))
}
