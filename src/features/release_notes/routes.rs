use axum::{routing::post, Router};

use crate::features::release_notes::handlers::{self, ReleaseNotesState};

/// Create routes for the release notes feature
pub fn routes(state: ReleaseNotesState) -> Router {
    Router::new()
        .route("/api/release-notes", post(handlers::generate_release_notes))
        .with_state(state)
}
