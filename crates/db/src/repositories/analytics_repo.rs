//! Read-side aggregation queries for the admin analytics report.
//!
//! Everything here is a pure read over the persisted state; enrollment data
//! is flattened out of the per-user JSONB documents with
//! `jsonb_array_elements`. Percentage derivation happens in the handler so
//! the zero-lesson guard lives in one place (`cursus_core::enrollment`).

use chrono::NaiveDate;
use cursus_core::catalog::Module;
use cursus_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

/// One course in the popularity ranking.
#[derive(Debug, FromRow)]
pub struct PopularityRow {
    pub course_id: DbId,
    pub title: String,
    pub enrollment_count: i64,
}

/// Per-course completion aggregate. `avg_completed_lessons` is the mean
/// completed-lesson count across the course's enrollments.
#[derive(Debug, FromRow)]
pub struct CompletionRow {
    pub course_id: DbId,
    pub title: String,
    pub modules: Json<Vec<Module>>,
    pub enrollment_count: i64,
    pub avg_completed_lessons: f64,
}

/// A recently registered student with their enrollment count.
#[derive(Debug, FromRow)]
pub struct RecentStudentRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub enrollment_count: i32,
    pub created_at: Timestamp,
}

/// Enrollments per calendar day.
#[derive(Debug, FromRow)]
pub struct TrendRow {
    pub day: NaiveDate,
    pub enrollment_count: i64,
}

/// A recent successful payment joined with the course title.
#[derive(Debug, FromRow)]
pub struct RecentPaymentRow {
    pub id: DbId,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub payer_name: String,
    pub course_title: Option<String>,
    pub created_at: Timestamp,
}

/// Read-only rollups consumed by the admin console.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Count of users with the student role.
    pub async fn count_students(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'student'")
            .fetch_one(pool)
            .await
    }

    /// Count of all courses, inactive included.
    pub async fn count_courses(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(pool)
            .await
    }

    /// Count of all enrollments across all users (flatten-and-count).
    pub async fn count_enrollments(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(jsonb_array_length(enrollments)), 0)::bigint FROM users",
        )
        .fetch_one(pool)
        .await
    }

    /// Sum of captured payment amounts, in minor currency units.
    pub async fn total_revenue(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::bigint FROM payments \
             WHERE status IN ('completed', 'success')",
        )
        .fetch_one(pool)
        .await
    }

    /// Top courses by enrollment count, descending. Courses with zero
    /// enrollments never appear since the aggregation is enrollment-driven.
    pub async fn course_popularity(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<PopularityRow>, sqlx::Error> {
        sqlx::query_as::<_, PopularityRow>(
            "SELECT c.id AS course_id, c.title, COUNT(*) AS enrollment_count \
             FROM users u \
             CROSS JOIN LATERAL jsonb_array_elements(u.enrollments) AS e \
             JOIN courses c ON c.id = (e->>'courseId')::bigint \
             GROUP BY c.id, c.title \
             ORDER BY enrollment_count DESC, c.id ASC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Per-course completion aggregates over courses with at least one
    /// enrollment. The percentage itself is derived by the caller from
    /// `modules` and `avg_completed_lessons`.
    pub async fn course_completion(pool: &PgPool) -> Result<Vec<CompletionRow>, sqlx::Error> {
        sqlx::query_as::<_, CompletionRow>(
            "SELECT c.id AS course_id, c.title, c.modules, \
                    COUNT(*) AS enrollment_count, \
                    AVG((SELECT COUNT(*) FROM jsonb_array_elements(e->'progress') AS p \
                         WHERE (p->>'completed')::boolean))::float8 AS avg_completed_lessons \
             FROM users u \
             CROSS JOIN LATERAL jsonb_array_elements(u.enrollments) AS e \
             JOIN courses c ON c.id = (e->>'courseId')::bigint \
             GROUP BY c.id, c.title, c.modules",
        )
        .fetch_all(pool)
        .await
    }

    /// Most recently registered students with their enrollment counts.
    pub async fn recent_students(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<RecentStudentRow>, sqlx::Error> {
        sqlx::query_as::<_, RecentStudentRow>(
            "SELECT id, name, email, jsonb_array_length(enrollments) AS enrollment_count, \
                    created_at \
             FROM users WHERE role = 'student' \
             ORDER BY created_at DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Enrollments per calendar day over the trailing window, ascending.
    pub async fn enrollment_trend(
        pool: &PgPool,
        days: i32,
    ) -> Result<Vec<TrendRow>, sqlx::Error> {
        sqlx::query_as::<_, TrendRow>(
            "SELECT (e->>'enrolledAt')::timestamptz::date AS day, \
                    COUNT(*) AS enrollment_count \
             FROM users u \
             CROSS JOIN LATERAL jsonb_array_elements(u.enrollments) AS e \
             WHERE (e->>'enrolledAt')::timestamptz >= NOW() - make_interval(days => $1) \
             GROUP BY day \
             ORDER BY day ASC",
        )
        .bind(days)
        .fetch_all(pool)
        .await
    }

    /// Most recent captured payments with payer and course names.
    pub async fn recent_payments(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<RecentPaymentRow>, sqlx::Error> {
        sqlx::query_as::<_, RecentPaymentRow>(
            "SELECT p.id, p.order_id, p.amount, p.currency, p.payer_name, \
                    c.title AS course_title, p.created_at \
             FROM payments p \
             LEFT JOIN courses c ON c.id = p.course_id \
             WHERE p.status IN ('completed', 'success') \
             ORDER BY p.created_at DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
