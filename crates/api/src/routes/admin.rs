//! Route definitions for the admin console.
//!
//! All handlers enforce the admin role via `RequireAdmin`. The upload route
//! raises the body limit to fit the 10 MiB document cap plus multipart
//! framing overhead.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin::{self, MAX_DOCUMENT_BYTES};
use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /analytics            -> analytics (cached)
/// GET    /courses              -> list_courses
/// POST   /courses              -> create_course
/// PUT    /courses/{id}         -> update_course
/// DELETE /courses/{id}         -> delete_course
/// POST   /upload-document      -> upload_document (multipart)
/// POST   /summarize-document   -> summarize_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(analytics::analytics))
        .route(
            "/courses",
            get(admin::list_courses).post(admin::create_course),
        )
        .route(
            "/courses/{id}",
            put(admin::update_course).delete(admin::delete_course),
        )
        .route(
            "/upload-document",
            post(admin::upload_document)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + 64 * 1024)),
        )
        .route("/summarize-document", post(admin::summarize_document))
}
