//! Route definitions for the public course catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::courses;
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET /                                                 -> list_courses
/// GET /{id}                                             -> get_course
/// GET /{course_id}/modules/{module_id}/lessons/{lesson_id} -> get_lesson
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list_courses))
        .route("/{id}", get(courses::get_course))
        .route(
            "/{course_id}/modules/{module_id}/lessons/{lesson_id}",
            get(courses::get_lesson),
        )
}
