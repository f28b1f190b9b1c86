//! Payment entity model and DTOs.

use cursus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full payment row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: DbId,
    /// Gateway-side order identifier; the join key for verification.
    pub order_id: String,
    /// Gateway-side payment identifier, set on capture.
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    /// Amount in minor currency units (paise).
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub course_id: DbId,
    pub payer_name: String,
    pub payer_email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a pending payment at order-creation time.
#[derive(Debug, Deserialize)]
pub struct CreatePayment {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub course_id: DbId,
    pub payer_name: String,
    pub payer_email: String,
}
