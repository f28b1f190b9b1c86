//! Repository for the `payments` table.
//!
//! Status transitions happen only through [`PaymentRepo::mark_captured`] and
//! [`PaymentRepo::mark_failed`]; both leave terminal states alone so a
//! duplicate verification callback cannot resurrect a failed payment.

use sqlx::PgPool;

use crate::models::payment::{CreatePayment, Payment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, order_id, payment_id, signature, amount, currency, status, \
                       course_id, payer_name, payer_email, created_at, updated_at";

/// Provides operations for payment records.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a pending payment at order-creation time.
    pub async fn create(pool: &PgPool, input: &CreatePayment) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (order_id, amount, currency, course_id, payer_name, payer_email)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(&input.order_id)
            .bind(input.amount)
            .bind(&input.currency)
            .bind(input.course_id)
            .bind(&input.payer_name)
            .bind(&input.payer_email)
            .fetch_one(pool)
            .await
    }

    /// Find a payment by its gateway order identifier.
    pub async fn find_by_order_id(
        pool: &PgPool,
        order_id: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE order_id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(order_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a verified capture: persist the gateway payment id and
    /// signature and move the payment to the given captured status.
    ///
    /// Returns `None` if no payment with that order id exists.
    pub async fn mark_captured(
        pool: &PgPool,
        order_id: &str,
        payment_id: &str,
        signature: Option<&str>,
        status: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET
                payment_id = $2,
                signature = $3,
                status = $4,
                updated_at = NOW()
             WHERE order_id = $1 AND status <> 'failed'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(order_id)
            .bind(payment_id)
            .bind(signature)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Record a verification failure. Terminal; only pending payments can
    /// transition here.
    pub async fn mark_failed(
        pool: &PgPool,
        order_id: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status = 'failed', updated_at = NOW()
             WHERE order_id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(order_id)
            .fetch_optional(pool)
            .await
    }
}
