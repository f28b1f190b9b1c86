//! HTTP-level integration tests for the admin analytics report.

mod common;

use axum::http::StatusCode;
use common::{
    build_test_app, create_admin, create_course_with_lessons, create_student, expect_status, get,
    get_auth, post_json_auth,
};
use cursus_db::models::payment::CreatePayment;
use cursus_db::repositories::PaymentRepo;
use sqlx::PgPool;

async fn enroll(pool: &PgPool, user_id: i64, course_id: i64, token: &str) {
    let body = serde_json::json!({ "userId": user_id, "courseId": course_id });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/enroll",
        body,
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn seed_payment(pool: &PgPool, order_id: &str, amount: i64, course_id: i64, outcome: &str) {
    PaymentRepo::create(
        pool,
        &CreatePayment {
            order_id: order_id.to_string(),
            amount,
            currency: "INR".to_string(),
            course_id,
            payer_name: "Payer".to_string(),
            payer_email: "payer@test.com".to_string(),
        },
    )
    .await
    .expect("payment seed should succeed");

    match outcome {
        "completed" => {
            PaymentRepo::mark_captured(pool, order_id, "pay_x", None, "completed")
                .await
                .expect("capture should succeed");
        }
        "failed" => {
            PaymentRepo::mark_failed(pool, order_id)
                .await
                .expect("failure should record");
        }
        _ => {} // leave pending
    }
}

/// The analytics endpoint is admin-only.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_analytics_requires_admin(pool: PgPool) {
    let (_student, student_token) = create_student(&pool, "Nosy").await;

    let response = get(build_test_app(pool.clone()), "/api/v1/admin/analytics").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/admin/analytics",
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// The composite report reflects counts, revenue, popularity ordering,
/// per-course completion, recent students, trend, and recent payments.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_analytics_report(pool: PgPool) {
    let (_admin, admin_token) = create_admin(&pool, "Analyst").await;
    let (alice, alice_token) = create_student(&pool, "AnaAlice").await;
    let (bob, bob_token) = create_student(&pool, "AnaBob").await;
    let (_carol, _carol_token) = create_student(&pool, "AnaCarol").await;

    let course_a = create_course_with_lessons(&pool, "Course A", 1, 2).await;
    let course_b = create_course_with_lessons(&pool, "Course B", 1, 4).await;
    let _course_c = create_course_with_lessons(&pool, "Course C", 1, 1).await;

    // A has two enrollments, B one, C none.
    enroll(&pool, alice.id, course_a.id, &alice_token).await;
    enroll(&pool, bob.id, course_a.id, &bob_token).await;
    enroll(&pool, alice.id, course_b.id, &alice_token).await;

    // Alice completes 1 of 2 lessons in A.
    let module_id = course_a.modules.0[0].id;
    let lesson_id = course_a.modules.0[0].lessons[0].id;
    let body = serde_json::json!({
        "courseId": course_a.id,
        "moduleId": module_id,
        "lessonId": lesson_id,
    });
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/progress",
        body,
        &alice_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Revenue counts captured payments only.
    seed_payment(&pool, "order_done_1", 50000, course_a.id, "completed").await;
    seed_payment(&pool, "order_done_2", 60000, course_b.id, "completed").await;
    seed_payment(&pool, "order_pending", 70000, course_a.id, "pending").await;
    seed_payment(&pool, "order_failed", 80000, course_b.id, "failed").await;

    let response = get_auth(build_test_app(pool), "/api/v1/admin/analytics", &admin_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    let data = &json["data"];

    // Core stats. The admin is not a student.
    assert_eq!(data["totalStudents"], 3);
    assert_eq!(data["totalCourses"], 3);
    assert_eq!(data["totalEnrollments"], 3);
    assert_eq!(data["totalRevenue"], 110000);

    // Popularity: A (2) before B (1); zero-enrollment C absent.
    let popularity = data["coursePopularity"].as_array().unwrap();
    assert_eq!(popularity.len(), 2);
    assert_eq!(popularity[0]["courseId"], course_a.id);
    assert_eq!(popularity[0]["enrollments"], 2);
    assert_eq!(popularity[1]["courseId"], course_b.id);
    assert_eq!(popularity[1]["enrollments"], 1);

    // Completion: A averages (1 + 0) / 2 completed of 2 lessons -> 25%,
    // B averages 0 of 4 -> 0%. Sorted descending.
    let completion = data["courseCompletion"].as_array().unwrap();
    assert_eq!(completion.len(), 2);
    assert_eq!(completion[0]["courseId"], course_a.id);
    assert_eq!(completion[0]["totalLessons"], 2);
    assert_eq!(completion[0]["averageCompletionPercentage"], 25);
    assert_eq!(completion[1]["courseId"], course_b.id);
    assert_eq!(completion[1]["averageCompletionPercentage"], 0);

    // Recent students: the three students, newest first, with counts.
    let recent = data["recentStudents"].as_array().unwrap();
    assert_eq!(recent.len(), 3);
    let alice_entry = recent
        .iter()
        .find(|s| s["id"] == alice.id)
        .expect("alice in recent students");
    assert_eq!(alice_entry["enrollmentCount"], 2);

    // Trend: all enrollments happened today.
    let trend = data["enrollmentTrend"].as_array().unwrap();
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0]["enrollments"], 3);

    // Recent payments: only the two captured ones, newest first.
    let payments = data["recentPayments"].as_array().unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0]["orderId"], "order_done_2");
    assert_eq!(payments[0]["courseTitle"], "Course B");
    assert_eq!(payments[1]["orderId"], "order_done_1");
}

/// Popularity is capped at the top five courses.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_analytics_popularity_top_five(pool: PgPool) {
    let (_admin, admin_token) = create_admin(&pool, "Ranker").await;

    // Six courses; each gets a distinct enrollment count via distinct users.
    let mut courses = Vec::new();
    for i in 0..6 {
        courses.push(create_course_with_lessons(&pool, &format!("Ranked {i}"), 1, 1).await);
    }
    // counts: course[0] -> 6 users, course[1] -> 5 users, ... course[5] -> 1.
    for (rank, course) in courses.iter().enumerate() {
        let enrollee_count = 6 - rank;
        for u in 0..enrollee_count {
            let (user, token) = create_student(&pool, &format!("Rank{rank}U{u}")).await;
            enroll(&pool, user.id, course.id, &token).await;
        }
    }

    let response = get_auth(build_test_app(pool), "/api/v1/admin/analytics", &admin_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    let popularity = json["data"]["coursePopularity"].as_array().unwrap();

    assert_eq!(popularity.len(), 5, "only the top five appear");
    let counts: Vec<i64> = popularity
        .iter()
        .map(|p| p["enrollments"].as_i64().unwrap())
        .collect();
    assert_eq!(counts, vec![6, 5, 4, 3, 2]);
}
