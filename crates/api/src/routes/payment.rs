//! Route definitions for the `/payment` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Routes mounted at `/payment`.
///
/// ```text
/// POST /create-order        -> create_order
/// POST /verify-payment      -> verify_payment
/// GET  /status/{order_id}   -> payment_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(payment::create_order))
        .route("/verify-payment", post(payment::verify_payment))
        .route("/status/{order_id}", get(payment::payment_status))
}
