//! Handlers for the `/auth` resource: registration, login, profile,
//! token verification, enrollment, and lesson progress.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cursus_core::catalog;
use cursus_core::enrollment::{self, Enrollment};
use cursus_core::error::CoreError;
use cursus_core::roles::ROLE_STUDENT;
use cursus_core::types::DbId;
use cursus_db::models::user::{CreateUser, UserResponse};
use cursus_db::repositories::{CourseRepo, UserRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::ensure_self_or_admin;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

/// Request body for `POST /auth/enroll`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub user_id: DbId,
    pub course_id: DbId,
    pub payment_id: Option<DbId>,
}

/// Request body for `POST /auth/progress`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub course_id: DbId,
    pub module_id: Uuid,
    pub lesson_id: Uuid,
}

/// Response body for `POST /auth/progress`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub success: bool,
    pub message: String,
    pub completion_percentage: i32,
}

/// Claims echo returned by `GET /auth/verify`.
#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Response body for `GET /auth/verify`.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub user: TokenInfo,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a student account. Rejects weak passwords and duplicate emails;
/// emails are stored lowercased so duplicates cannot differ by case.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let email = input.email.trim().to_lowercase();

    // Application-level existence check; uq_users_email backs it up.
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email,
            password_hash,
            role: ROLE_STUDENT.to_string(),
        },
    )
    .await?;

    let token = generate_token(user.id, &user.name, &user.email, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Registration successful".into(),
            user: user.into_response(),
            token,
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. The response user includes the
/// enrollment list so clients can restore course state on login.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = input.email.trim().to_lowercase();

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    let token = generate_token(user.id, &user.name, &user.email, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        user: user.into_response(),
        token,
    }))
}

/// GET /api/v1/auth/profile/{user_id}
///
/// Return a user's profile. Students may only read their own.
pub async fn profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    ensure_self_or_admin(&auth, user_id)?;

    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", user_id)))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "user": user.into_response(),
    })))
}

/// GET /api/v1/auth/verify
///
/// Echo the authenticated token's identity claims.
pub async fn verify(auth: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        message: "Token is valid".into(),
        user: TokenInfo {
            id: auth.user_id,
            name: auth.name,
            email: auth.email,
            role: auth.role,
        },
    })
}

/// POST /api/v1/auth/enroll
///
/// Enroll a user in a course. Idempotent: enrolling twice reports success
/// without creating a duplicate and without touching the existing record's
/// payment reference.
pub async fn enroll(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<EnrollRequest>,
) -> AppResult<Json<MessageResponse>> {
    ensure_self_or_admin(&auth, input.user_id)?;

    // Course must exist before we touch the user document.
    CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", input.course_id)))?;

    let mut tx = state.pool.begin().await?;

    let user = UserRepo::find_by_id_for_update(&mut tx, input.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", input.user_id)))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let mut enrollments = user.enrollments.0;
    if enrollment::is_enrolled(&enrollments, input.course_id) {
        tx.commit().await?;
        return Ok(Json(MessageResponse::new("Already enrolled in this course")));
    }

    enrollments.push(Enrollment::new(input.course_id, input.payment_id, Utc::now()));
    UserRepo::store_enrollments(&mut tx, input.user_id, &enrollments).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = input.user_id,
        course_id = input.course_id,
        "User enrolled in course"
    );

    Ok(Json(MessageResponse::new("Successfully enrolled in course")))
}

/// POST /api/v1/auth/progress
///
/// Mark a lesson complete for the authenticated user and return the updated
/// completion percentage. The (module, lesson) pair must belong to the
/// course's structure; the whole enrollment document is persisted in one
/// write under a row lock so concurrent updates for the same user serialize.
pub async fn update_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProgressRequest>,
) -> AppResult<Json<ProgressResponse>> {
    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", input.course_id)))?;

    catalog::validate_membership(&course.modules.0, input.module_id, input.lesson_id)
        .map_err(AppError::Core)?;

    let mut tx = state.pool.begin().await?;

    let user = UserRepo::find_by_id_for_update(&mut tx, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth.user_id)))?;

    let mut enrollments = user.enrollments.0;
    let record = enrollment::find_enrollment_mut(&mut enrollments, input.course_id)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Enrollment",
                id: format!("for course {}", input.course_id),
            })
        })?;

    enrollment::mark_lesson_complete(
        &mut record.progress,
        input.module_id,
        input.lesson_id,
        Utc::now(),
    );

    let total = catalog::total_lessons(&course.modules.0);
    let completed = record.completed_lessons();
    record.completion_percentage = enrollment::completion_percentage(completed, total);
    let percentage = record.completion_percentage;

    UserRepo::store_enrollments(&mut tx, auth.user_id, &enrollments).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        course_id = input.course_id,
        percentage,
        "Lesson progress recorded"
    );

    Ok(Json(ProgressResponse {
        success: true,
        message: "Progress updated successfully".into(),
        completion_percentage: percentage,
    }))
}
