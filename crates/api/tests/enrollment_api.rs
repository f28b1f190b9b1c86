//! HTTP-level integration tests for enrollment and lesson progress.

mod common;

use axum::http::StatusCode;
use common::{
    build_test_app, create_admin, create_course_with_lessons, create_student, expect_status,
    post_json_auth,
};
use cursus_db::repositories::UserRepo;
use sqlx::PgPool;
use uuid::Uuid;

/// Enroll a student in a course through the API.
async fn enroll(pool: &PgPool, user_id: i64, course_id: i64, token: &str) -> serde_json::Value {
    let body = serde_json::json!({ "userId": user_id, "courseId": course_id });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/enroll",
        body,
        token,
    )
    .await;
    expect_status(response, StatusCode::OK).await
}

/// Mark a lesson complete and return the response body.
async fn mark_complete(
    pool: &PgPool,
    token: &str,
    course_id: i64,
    module_id: Uuid,
    lesson_id: Uuid,
) -> axum::response::Response {
    let body = serde_json::json!({
        "courseId": course_id,
        "moduleId": module_id,
        "lessonId": lesson_id,
    });
    post_json_auth(build_test_app(pool.clone()), "/api/v1/auth/progress", body, token).await
}

/// Enrolling creates exactly one enrollment with zero progress.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_enroll_success(pool: PgPool) {
    let (user, token) = create_student(&pool, "Enrollee").await;
    let course = create_course_with_lessons(&pool, "Rust Basics", 2, 2).await;

    let json = enroll(&pool, user.id, course.id, &token).await;
    assert_eq!(json["message"], "Successfully enrolled in course");

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.enrollments.0.len(), 1);
    assert_eq!(stored.enrollments.0[0].course_id, course.id);
    assert_eq!(stored.enrollments.0[0].completion_percentage, 0);
    assert!(stored.enrollments.0[0].progress.is_empty());
}

/// Enrolling twice is an idempotent success: one record, and the original
/// payment reference is left untouched.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_enroll_twice_is_idempotent(pool: PgPool) {
    let (user, token) = create_student(&pool, "Repeat").await;
    let course = create_course_with_lessons(&pool, "Rust Basics", 1, 3).await;

    let body = serde_json::json!({
        "userId": user.id,
        "courseId": course.id,
        "paymentId": 42,
    });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/enroll",
        body,
        &token,
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // Second call carries a different payment reference; it must not win.
    let body = serde_json::json!({
        "userId": user.id,
        "courseId": course.id,
        "paymentId": 99,
    });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/enroll",
        body,
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["message"], "Already enrolled in this course");

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.enrollments.0.len(), 1, "exactly one enrollment");
    assert_eq!(stored.enrollments.0[0].payment_id, Some(42));
}

/// Enrolling in a nonexistent course returns 404 and writes nothing.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_enroll_unknown_course(pool: PgPool) {
    let (user, token) = create_student(&pool, "Lost").await;

    let body = serde_json::json!({ "userId": user.id, "courseId": 9999 });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/enroll",
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(stored.enrollments.0.is_empty());
}

/// Students cannot enroll other users; admins can.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_enroll_ownership(pool: PgPool) {
    let (alice, _alice_token) = create_student(&pool, "OwnerAlice").await;
    let (_bob, bob_token) = create_student(&pool, "OwnerBob").await;
    let (_admin, admin_token) = create_admin(&pool, "OwnerAdmin").await;
    let course = create_course_with_lessons(&pool, "Ownership", 1, 1).await;

    let body = serde_json::json!({ "userId": alice.id, "courseId": course.id });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/enroll",
        body.clone(),
        &bob_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/enroll",
        body,
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Completing lessons one by one walks the percentage through 25/50/75/100
/// on a 2x2 course.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_progress_percentage_steps(pool: PgPool) {
    let (user, token) = create_student(&pool, "Stepper").await;
    let course = create_course_with_lessons(&pool, "Percentages", 2, 2).await;
    enroll(&pool, user.id, course.id, &token).await;

    let modules = &course.modules.0;
    let pairs: Vec<(Uuid, Uuid)> = modules
        .iter()
        .flat_map(|m| m.lessons.iter().map(move |l| (m.id, l.id)))
        .collect();
    assert_eq!(pairs.len(), 4);

    let expected = [25, 50, 75, 100];
    for (i, (module_id, lesson_id)) in pairs.iter().enumerate() {
        let response = mark_complete(&pool, &token, course.id, *module_id, *lesson_id).await;
        let json = expect_status(response, StatusCode::OK).await;
        assert_eq!(
            json["completionPercentage"], expected[i],
            "after {} lessons",
            i + 1
        );
    }
}

/// Re-marking the same lesson changes neither cardinality nor percentage.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_progress_is_idempotent(pool: PgPool) {
    let (user, token) = create_student(&pool, "Again").await;
    let course = create_course_with_lessons(&pool, "Idempotent", 2, 2).await;
    enroll(&pool, user.id, course.id, &token).await;

    let module_id = course.modules.0[0].id;
    let lesson_id = course.modules.0[0].lessons[0].id;

    for _ in 0..3 {
        let response = mark_complete(&pool, &token, course.id, module_id, lesson_id).await;
        let json = expect_status(response, StatusCode::OK).await;
        assert_eq!(json["completionPercentage"], 25);
    }

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    let progress = &stored.enrollments.0[0].progress;
    assert_eq!(progress.len(), 1, "one entry regardless of call count");
    assert!(progress[0].completed);
}

/// Progress against a course the user is not enrolled in returns 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_progress_requires_enrollment(pool: PgPool) {
    let (_user, token) = create_student(&pool, "Stranger").await;
    let course = create_course_with_lessons(&pool, "Members Only", 1, 2).await;

    let module_id = course.modules.0[0].id;
    let lesson_id = course.modules.0[0].lessons[0].id;

    let response = mark_complete(&pool, &token, course.id, module_id, lesson_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// A (module, lesson) pair that does not belong to the course's structure
/// is rejected as a validation error, not silently recorded.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_progress_rejects_foreign_lesson(pool: PgPool) {
    let (user, token) = create_student(&pool, "Mismatcher").await;
    let course = create_course_with_lessons(&pool, "Strict", 1, 2).await;
    let other = create_course_with_lessons(&pool, "Other", 1, 2).await;
    enroll(&pool, user.id, course.id, &token).await;

    // Real module from the enrolled course, lesson from another course.
    let module_id = course.modules.0[0].id;
    let foreign_lesson = other.modules.0[0].lessons[0].id;

    let response = mark_complete(&pool, &token, course.id, module_id, foreign_lesson).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(
        stored.enrollments.0[0].progress.is_empty(),
        "nothing may be recorded for a mismatched pair"
    );
}

/// Completing lessons in one course does not disturb another enrollment.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_progress_is_scoped_per_course(pool: PgPool) {
    let (user, token) = create_student(&pool, "TwoTracks").await;
    let course_a = create_course_with_lessons(&pool, "Track A", 1, 2).await;
    let course_b = create_course_with_lessons(&pool, "Track B", 1, 4).await;
    enroll(&pool, user.id, course_a.id, &token).await;
    enroll(&pool, user.id, course_b.id, &token).await;

    let module_id = course_a.modules.0[0].id;
    let lesson_id = course_a.modules.0[0].lessons[0].id;
    let response = mark_complete(&pool, &token, course_a.id, module_id, lesson_id).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["completionPercentage"], 50);

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    let enrollments = &stored.enrollments.0;
    let a = enrollments.iter().find(|e| e.course_id == course_a.id).unwrap();
    let b = enrollments.iter().find(|e| e.course_id == course_b.id).unwrap();
    assert_eq!(a.completion_percentage, 50);
    assert_eq!(b.completion_percentage, 0);
    assert!(b.progress.is_empty());
}
