//! Handlers for the public course catalog.

use axum::extract::{Path, State};
use axum::Json;
use cursus_core::catalog::{self, Lesson};
use cursus_core::error::CoreError;
use cursus_core::types::DbId;
use cursus_db::models::course::Course;
use cursus_db::repositories::CourseRepo;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Course list response with a convenience count.
#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Course>,
}

/// Lightweight parent references in the lesson drill-down response.
#[derive(Debug, Serialize)]
pub struct CourseRef {
    pub id: DbId,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ModuleRef {
    pub id: Uuid,
    pub title: String,
}

/// Payload for the single-lesson endpoint.
#[derive(Debug, Serialize)]
pub struct LessonContext {
    pub course: CourseRef,
    pub module: ModuleRef,
    pub lesson: Lesson,
}

/// GET /api/v1/courses
///
/// List active courses for the public catalog.
pub async fn list_courses(State(state): State<AppState>) -> AppResult<Json<CourseListResponse>> {
    let courses = CourseRepo::list_active(&state.pool).await?;
    Ok(Json(CourseListResponse {
        success: true,
        count: courses.len(),
        data: courses,
    }))
}

/// GET /api/v1/courses/{id}
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", id)))?;
    Ok(Json(DataResponse::new(course)))
}

/// GET /api/v1/courses/{course_id}/modules/{module_id}/lessons/{lesson_id}
///
/// Drill down to a single lesson, 404ing at whichever level is missing.
pub async fn get_lesson(
    State(state): State<AppState>,
    Path((course_id, module_id, lesson_id)): Path<(DbId, Uuid, Uuid)>,
) -> AppResult<Json<DataResponse<LessonContext>>> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", course_id)))?;

    let module = catalog::find_module(&course.modules.0, module_id)
        .ok_or_else(|| AppError::Core(CoreError::not_found("Module", module_id)))?;

    let lesson = module
        .lessons
        .iter()
        .find(|l| l.id == lesson_id)
        .ok_or_else(|| AppError::Core(CoreError::not_found("Lesson", lesson_id)))?;

    Ok(Json(DataResponse::new(LessonContext {
        course: CourseRef {
            id: course.id,
            title: course.title.clone(),
        },
        module: ModuleRef {
            id: module.id,
            title: module.title.clone(),
        },
        lesson: lesson.clone(),
    })))
}
