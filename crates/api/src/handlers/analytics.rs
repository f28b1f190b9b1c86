//! Admin analytics: a composite read-only report over users, courses, and
//! payments, optionally served from the response cache.
//!
//! The report reflects persisted state at computation time; staleness up to
//! the cache TTL is acceptable and intentional. The report types derive
//! `Deserialize` as well as `Serialize` so cached JSON round-trips.

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use cursus_core::catalog;
use cursus_core::enrollment;
use cursus_core::types::{DbId, Timestamp};
use cursus_db::repositories::AnalyticsRepo;
use cursus_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Cache key for the composite report.
pub const ANALYTICS_CACHE_KEY: &str = "cache:admin:analytics";

/// Cache TTL: 30 minutes.
pub const ANALYTICS_CACHE_TTL_SECS: u64 = 30 * 60;

/// How many entries the top-courses ranking carries.
const POPULARITY_LIMIT: i64 = 5;

/// How many recent students / payments the report carries.
const RECENT_LIMIT: i64 = 5;

/// Trailing window for the enrollment trend, in days.
const TREND_WINDOW_DAYS: i32 = 7;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePopularity {
    pub course_id: DbId,
    pub title: String,
    pub enrollments: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCompletion {
    pub course_id: DbId,
    pub title: String,
    pub total_lessons: i64,
    pub enrollments: i64,
    pub average_completion_percentage: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentStudent {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub enrollment_count: i32,
    pub registered_at: Timestamp,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub enrollments: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPayment {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub payer_name: String,
    pub course_title: Option<String>,
    pub paid_at: Timestamp,
}

/// The composite analytics document consumed by the admin console.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_students: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    /// Sum of captured payment amounts, minor currency units.
    pub total_revenue: i64,
    pub course_popularity: Vec<CoursePopularity>,
    pub course_completion: Vec<CourseCompletion>,
    pub recent_students: Vec<RecentStudent>,
    pub enrollment_trend: Vec<TrendPoint>,
    pub recent_payments: Vec<RecentPayment>,
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/analytics
///
/// Composite analytics report, served through the explicit cache decorator
/// with a 30-minute TTL. Cache unavailability degrades to a direct read.
pub async fn analytics(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<AnalyticsReport>>> {
    let pool = state.pool.clone();
    let report = state
        .cache
        .get_or_compute(ANALYTICS_CACHE_KEY, ANALYTICS_CACHE_TTL_SECS, || async move {
            build_report(&pool).await
        })
        .await?;

    Ok(Json(DataResponse::new(report)))
}

/// Assemble the full report from the aggregation queries.
pub async fn build_report(pool: &DbPool) -> AppResult<AnalyticsReport> {
    let total_students = AnalyticsRepo::count_students(pool).await?;
    let total_courses = AnalyticsRepo::count_courses(pool).await?;
    let total_enrollments = AnalyticsRepo::count_enrollments(pool).await?;
    let total_revenue = AnalyticsRepo::total_revenue(pool).await?;

    let course_popularity = AnalyticsRepo::course_popularity(pool, POPULARITY_LIMIT)
        .await?
        .into_iter()
        .map(|row| CoursePopularity {
            course_id: row.course_id,
            title: row.title,
            enrollments: row.enrollment_count,
        })
        .collect();

    let mut course_completion: Vec<CourseCompletion> = AnalyticsRepo::course_completion(pool)
        .await?
        .into_iter()
        .map(|row| {
            let total_lessons = catalog::total_lessons(&row.modules.0);
            CourseCompletion {
                course_id: row.course_id,
                title: row.title,
                total_lessons: total_lessons as i64,
                enrollments: row.enrollment_count,
                average_completion_percentage: enrollment::average_completion_percentage(
                    row.avg_completed_lessons,
                    total_lessons,
                ),
            }
        })
        .collect();
    course_completion.sort_by(|a, b| {
        b.average_completion_percentage
            .cmp(&a.average_completion_percentage)
    });

    let recent_students = AnalyticsRepo::recent_students(pool, RECENT_LIMIT)
        .await?
        .into_iter()
        .map(|row| RecentStudent {
            id: row.id,
            name: row.name,
            email: row.email,
            enrollment_count: row.enrollment_count,
            registered_at: row.created_at,
        })
        .collect();

    let enrollment_trend = AnalyticsRepo::enrollment_trend(pool, TREND_WINDOW_DAYS)
        .await?
        .into_iter()
        .map(|row| TrendPoint {
            date: row.day,
            enrollments: row.enrollment_count,
        })
        .collect();

    let recent_payments = AnalyticsRepo::recent_payments(pool, RECENT_LIMIT)
        .await?
        .into_iter()
        .map(|row| RecentPayment {
            order_id: row.order_id,
            amount: row.amount,
            currency: row.currency,
            payer_name: row.payer_name,
            course_title: row.course_title,
            paid_at: row.created_at,
        })
        .collect();

    Ok(AnalyticsReport {
        total_students,
        total_courses,
        total_enrollments,
        total_revenue,
        course_popularity,
        course_completion,
        recent_students,
        enrollment_trend,
        recent_payments,
    })
}
