//! HTTP-level integration tests for the public course catalog.

mod common;

use axum::http::StatusCode;
use common::{build_test_app, create_course_with_lessons, expect_status, get};
use cursus_db::models::course::UpdateCourse;
use cursus_db::repositories::CourseRepo;
use sqlx::PgPool;
use uuid::Uuid;

/// The public listing contains only active courses.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_active_courses_only(pool: PgPool) {
    let visible = create_course_with_lessons(&pool, "Visible", 1, 1).await;
    let hidden = create_course_with_lessons(&pool, "Hidden", 1, 1).await;
    CourseRepo::update(
        &pool,
        hidden.id,
        &UpdateCourse {
            title: None,
            description: None,
            instructor: None,
            duration: None,
            thumbnail: None,
            price: None,
            category: None,
            modules: None,
            is_active: Some(false),
        },
    )
    .await
    .expect("update should succeed");

    let response = get(build_test_app(pool), "/api/v1/courses").await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["id"], visible.id);
    assert_eq!(json["data"][0]["title"], "Visible");
}

/// A single course fetch returns the embedded module/lesson tree.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_course(pool: PgPool) {
    let course = create_course_with_lessons(&pool, "Tree", 2, 3).await;

    let response = get(build_test_app(pool), &format!("/api/v1/courses/{}", course.id)).await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["title"], "Tree");
    assert_eq!(json["data"]["modules"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["data"]["modules"][0]["lessons"].as_array().unwrap().len(),
        3
    );
}

/// Unknown course id 404s.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_course_not_found(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/courses/987654").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// The lesson drill-down returns the lesson with its parent references and
/// 404s at whichever level is missing.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_lesson_drill_down(pool: PgPool) {
    let course = create_course_with_lessons(&pool, "Drill", 1, 2).await;
    let module = &course.modules.0[0];
    let target = &module.lessons[1];

    let uri = format!(
        "/api/v1/courses/{}/modules/{}/lessons/{}",
        course.id, module.id, target.id
    );
    let response = get(build_test_app(pool.clone()), &uri).await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["course"]["id"], course.id);
    assert_eq!(json["data"]["module"]["title"], module.title);
    assert_eq!(json["data"]["lesson"]["title"], target.title);

    // Unknown module.
    let uri = format!(
        "/api/v1/courses/{}/modules/{}/lessons/{}",
        course.id,
        Uuid::new_v4(),
        target.id
    );
    let response = get(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown lesson under a real module.
    let uri = format!(
        "/api/v1/courses/{}/modules/{}/lessons/{}",
        course.id,
        module.id,
        Uuid::new_v4()
    );
    let response = get(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
