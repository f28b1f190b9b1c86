//! Handlers for payment order creation, capture verification, and status.
//!
//! Orders are created pending, then verified either via the test-mode
//! marker or the gateway HMAC signature. Successful verification enrolls
//! the payer; a duplicate verification call (client retry after a network
//! timeout) must still return success without creating a second enrollment.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use cursus_core::catalog::DEFAULT_CURRENCY;
use cursus_core::enrollment::{self, Enrollment};
use cursus_core::error::CoreError;
use cursus_core::payment::{self, PaymentStatus};
use cursus_core::types::DbId;
use cursus_db::models::payment::{CreatePayment, Payment};
use cursus_db::repositories::{CourseRepo, PaymentRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /payment/create-order`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub course_id: DbId,
    pub user_id: DbId,
    #[validate(email(message = "userEmail must be a valid address"))]
    pub user_email: String,
    #[validate(length(min = 1, message = "userName must not be empty"))]
    pub user_name: String,
    /// Optional override; defaults to the course's listed price.
    pub amount: Option<i64>,
}

/// Request body for `POST /payment/verify-payment`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    pub user_id: DbId,
}

/// Order descriptor handed to the client for checkout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDescriptor {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    /// Public gateway key id, or `"test_key"` in test mode.
    pub key: String,
}

/// Response body for `POST /payment/create-order`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub success: bool,
    pub test_mode: bool,
    pub message: String,
    pub data: OrderDescriptor,
}

/// Response body for `POST /payment/verify-payment`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub test_mode: bool,
    pub message: String,
    pub data: Payment,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/payment/create-order
///
/// Create a pending payment for a course. Rejected with 409 when the user is
/// already enrolled, before any payment row or gateway order exists.
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderResponse>> {
    input.validate()?;

    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", input.course_id)))?;

    let user = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", input.user_id)))?;

    if enrollment::is_enrolled(&user.enrollments.0, input.course_id) {
        return Err(AppError::Core(CoreError::Conflict(
            "Already enrolled in this course".into(),
        )));
    }

    let amount = input.amount.unwrap_or(course.price);
    if amount <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Amount must be positive".into(),
        )));
    }

    let (order_id, key, test_mode) = match &state.gateway {
        Some(gateway) => {
            let receipt = format!("receipt_{}", Utc::now().timestamp_millis());
            let order = gateway
                .create_order(amount, DEFAULT_CURRENCY, &receipt)
                .await
                .map_err(|e| AppError::Upstream(format!("Error creating order: {e}")))?;
            (order.id, gateway.key_id().to_string(), false)
        }
        None => (
            payment::generate_test_order_id(),
            "test_key".to_string(),
            true,
        ),
    };

    let record = PaymentRepo::create(
        &state.pool,
        &CreatePayment {
            order_id,
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            course_id: input.course_id,
            payer_name: input.user_name.trim().to_string(),
            payer_email: input.user_email.trim().to_lowercase(),
        },
    )
    .await?;

    tracing::info!(
        payment_id = record.id,
        order_id = %record.order_id,
        course_id = input.course_id,
        test_mode,
        "Payment order created"
    );

    Ok(Json(OrderResponse {
        success: true,
        test_mode,
        message: if test_mode {
            "Test mode - payment gateway not configured".into()
        } else {
            "Order created".into()
        },
        data: OrderDescriptor {
            order_id: record.order_id.clone(),
            amount: record.amount,
            currency: record.currency.clone(),
            key,
        },
    }))
}

/// POST /api/v1/payment/verify-payment
///
/// Verify a capture and enroll the payer. Signature mismatch marks the
/// payment `failed` (terminal) and never creates an enrollment; a valid
/// duplicate callback returns success without a second enrollment.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(input): Json<VerifyPaymentRequest>,
) -> AppResult<Json<VerifyResponse>> {
    let existing = PaymentRepo::find_by_order_id(&state.pool, &input.order_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound {
            entity: "Payment",
            id: input.order_id.clone(),
        }))?;

    if PaymentStatus::parse(&existing.status) == Some(PaymentStatus::Failed) {
        return Err(AppError::BadRequest(
            "Payment has already failed and cannot be verified".into(),
        ));
    }

    let test_mode = payment::is_test_order(&input.order_id);

    let verified = if test_mode {
        // Trusted test path: accept unconditionally.
        let payment_id = input
            .payment_id
            .clone()
            .unwrap_or_else(payment::generate_test_payment_id);
        PaymentRepo::mark_captured(
            &state.pool,
            &input.order_id,
            &payment_id,
            None,
            PaymentStatus::Completed.as_str(),
        )
        .await?
    } else {
        let gateway = state.gateway.as_ref().ok_or_else(|| {
            AppError::Upstream("Payment gateway not configured".into())
        })?;

        let payment_id = input
            .payment_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Payment ID is required".into()))?;
        let signature = input
            .signature
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Signature is required".into()))?;

        if !payment::verify_signature(gateway.key_secret(), &input.order_id, payment_id, signature)
        {
            PaymentRepo::mark_failed(&state.pool, &input.order_id).await?;
            tracing::warn!(order_id = %input.order_id, "Payment signature mismatch");
            return Err(AppError::BadRequest("Invalid payment signature".into()));
        }

        PaymentRepo::mark_captured(
            &state.pool,
            &input.order_id,
            payment_id,
            Some(signature),
            PaymentStatus::Completed.as_str(),
        )
        .await?
    };

    let captured = verified.ok_or_else(|| AppError::Core(CoreError::NotFound {
        entity: "Payment",
        id: input.order_id.clone(),
    }))?;

    enroll_after_capture(&state, input.user_id, &captured).await?;

    tracing::info!(
        order_id = %captured.order_id,
        user_id = input.user_id,
        test_mode,
        "Payment verified"
    );

    Ok(Json(VerifyResponse {
        success: true,
        test_mode,
        message: if test_mode {
            "Payment verified (test mode)".into()
        } else {
            "Payment verified successfully".into()
        },
        data: captured,
    }))
}

/// GET /api/v1/payment/status/{order_id}
pub async fn payment_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<DataResponse<Payment>>> {
    let record = PaymentRepo::find_by_order_id(&state.pool, &order_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Payment",
            id: order_id,
        }))?;
    Ok(Json(DataResponse::new(record)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Enroll the payer in the payment's course, idempotently.
///
/// Runs under the user row lock so concurrent duplicate verifications
/// serialize; the second caller observes the enrollment and skips.
async fn enroll_after_capture(
    state: &AppState,
    user_id: DbId,
    captured: &Payment,
) -> AppResult<()> {
    let mut tx = state.pool.begin().await?;

    let user = UserRepo::find_by_id_for_update(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", user_id)))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let mut enrollments = user.enrollments.0;
    if !enrollment::is_enrolled(&enrollments, captured.course_id) {
        enrollments.push(Enrollment::new(
            captured.course_id,
            Some(captured.id),
            Utc::now(),
        ));
        UserRepo::store_enrollments(&mut tx, user_id, &enrollments).await?;
        tracing::info!(
            user_id,
            course_id = captured.course_id,
            payment_id = captured.id,
            "User enrolled via payment capture"
        );
    }
    tx.commit().await?;

    Ok(())
}
