pub mod admin;
pub mod auth;
pub mod courses;
pub mod health;
pub mod payment;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/verify                                     token check (requires auth)
/// /auth/profile/{user_id}                          profile (self or admin)
/// /auth/enroll                                     enroll (self or admin)
/// /auth/progress                                   mark lesson complete (requires auth)
///
/// /courses                                         active course catalog (public)
/// /courses/{id}                                    single course (public)
/// /courses/{id}/modules/{mid}/lessons/{lid}        lesson drill-down (public)
///
/// /payment/create-order                            create pending order (public)
/// /payment/verify-payment                          verify capture + enroll (public)
/// /payment/status/{order_id}                       payment status (public)
///
/// /admin/analytics                                 composite report (admin, cached)
/// /admin/courses                                   list, create (admin only)
/// /admin/courses/{id}                              update, delete (admin only)
/// /admin/upload-document                           attach PDF to lesson (admin, multipart)
/// /admin/summarize-document                        AI summary of lesson PDF (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication, enrollment, and progress.
        .nest("/auth", auth::router())
        // Public course catalog.
        .nest("/courses", courses::router())
        // Payment order creation and capture verification.
        .nest("/payment", payment::router())
        // Admin console (course management, uploads, analytics).
        .nest("/admin", admin::router())
}
