//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register            -> register
/// POST /login               -> login
/// GET  /verify              -> verify (requires auth)
/// GET  /profile/{user_id}   -> profile (self or admin)
/// POST /enroll              -> enroll (self or admin)
/// POST /progress            -> update_progress (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify", get(auth::verify))
        .route("/profile/{user_id}", get(auth::profile))
        .route("/enroll", post(auth::enroll))
        .route("/progress", post(auth::update_progress))
}
