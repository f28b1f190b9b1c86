//! Admin console handlers: course management, lesson document upload, and
//! AI document summarization.
//!
//! All endpoints require the admin role via [`RequireAdmin`]. Course
//! mutations invalidate the analytics response cache.

use std::path::PathBuf;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cursus_core::catalog::{self, LessonDocument};
use cursus_core::error::CoreError;
use cursus_core::types::DbId;
use cursus_db::models::course::{Course, CreateCourse, UpdateCourse};
use cursus_db::repositories::CourseRepo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;
use crate::summarize::build_prompt;

/// Upper bound on uploaded document size.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Glob cleared from the cache whenever course data changes.
const CACHE_CLEAR_PATTERN: &str = "cache:*";

// ---------------------------------------------------------------------------
// Course CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/courses
///
/// List all courses for the admin console, inactive included.
pub async fn list_courses(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let courses = CourseRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse::new(courses)))
}

/// POST /api/v1/admin/courses
///
/// Create a course. Module/lesson identifiers missing from the submitted
/// tree are generated during deserialization.
pub async fn create_course(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    if let Some(category) = &input.category {
        catalog::validate_category(category).map_err(AppError::Core)?;
    }

    let course = CourseRepo::create(&state.pool, &input).await?;
    state.cache.delete_pattern(CACHE_CLEAR_PATTERN).await;

    tracing::info!(
        course_id = course.id,
        user_id = admin.user_id,
        "Course created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(course))))
}

/// PUT /api/v1/admin/courses/{id}
pub async fn update_course(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    if let Some(category) = &input.category {
        catalog::validate_category(category).map_err(AppError::Core)?;
    }

    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", id)))?;
    state.cache.delete_pattern(CACHE_CLEAR_PATTERN).await;

    tracing::info!(course_id = id, user_id = admin.user_id, "Course updated");

    Ok(Json(DataResponse::new(course)))
}

/// DELETE /api/v1/admin/courses/{id}
///
/// Delete a course and remove its uploaded lesson documents from disk
/// (best-effort; a missing file is not an error).
pub async fn delete_course(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let course = CourseRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", id)))?;

    for module in &course.modules.0 {
        for lesson in &module.lessons {
            if let Some(document) = &lesson.document {
                let path = PathBuf::from(&state.config.upload_dir).join(&document.filepath);
                let _ = tokio::fs::remove_file(path).await;
            }
        }
    }

    state.cache.delete_pattern(CACHE_CLEAR_PATTERN).await;

    tracing::info!(course_id = id, user_id = admin.user_id, "Course deleted");

    Ok(Json(MessageResponse::new("Course deleted successfully")))
}

// ---------------------------------------------------------------------------
// Document upload
// ---------------------------------------------------------------------------

/// A file already written to the upload directory.
struct StoredUpload {
    original_filename: String,
    stored_name: String,
    absolute_path: PathBuf,
}

/// Payload for the upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub lesson_id: Uuid,
    pub document: LessonDocument,
}

/// POST /api/v1/admin/upload-document
///
/// Multipart upload of a PDF document onto a (course, module, lesson).
/// Cleanup-on-failure invariant: if any validation fails after the file has
/// been written to storage, the file is deleted before the error returns.
pub async fn upload_document(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<UploadedDocument>>> {
    let mut course_id: Option<DbId> = None;
    let mut module_id: Option<Uuid> = None;
    let mut lesson_id: Option<Uuid> = None;
    let mut stored: Option<StoredUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "courseId" => course_id = Some(parse_text_field(field, "courseId").await?),
            "moduleId" => module_id = Some(parse_text_field(field, "moduleId").await?),
            "lessonId" => lesson_id = Some(parse_text_field(field, "lessonId").await?),
            "document" => stored = Some(store_upload(&state, field).await?),
            _ => {}
        }
    }

    let stored = stored.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;

    // Everything after the file hit disk must clean up on failure.
    match attach_document(&state, course_id, module_id, lesson_id, &stored).await {
        Ok(uploaded) => {
            tracing::info!(
                course_id = course_id.unwrap_or_default(),
                lesson_id = %uploaded.lesson_id,
                user_id = admin.user_id,
                "Lesson document uploaded"
            );
            Ok(Json(DataResponse::new(uploaded)))
        }
        Err(err) => {
            let _ = tokio::fs::remove_file(&stored.absolute_path).await;
            Err(err)
        }
    }
}

/// Read a text field and parse it, mapping failure to a 400.
async fn parse_text_field<T: std::str::FromStr>(
    field: Field<'_>,
    name: &str,
) -> AppResult<T> {
    let raw = field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid {name} field: {e}")))?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {name} value")))
}

/// Validate and persist the uploaded file bytes to the upload directory.
async fn store_upload(state: &AppState, field: Field<'_>) -> AppResult<StoredUpload> {
    let original_filename = field
        .file_name()
        .unwrap_or("document.pdf")
        .to_string();

    if field.content_type() != Some("application/pdf") {
        return Err(AppError::BadRequest("Only PDF files are allowed".into()));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if data.len() > MAX_DOCUMENT_BYTES {
        return Err(AppError::BadRequest(
            "Document exceeds the 10 MiB size limit".into(),
        ));
    }

    let stored_name = format!("{}.pdf", Uuid::new_v4());
    let dir = PathBuf::from(&state.config.upload_dir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

    let absolute_path = dir.join(&stored_name);
    tokio::fs::write(&absolute_path, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    Ok(StoredUpload {
        original_filename,
        stored_name,
        absolute_path,
    })
}

/// Attach a stored file to its lesson and persist the course document.
///
/// Replacing an existing document deletes the previous file from disk.
async fn attach_document(
    state: &AppState,
    course_id: Option<DbId>,
    module_id: Option<Uuid>,
    lesson_id: Option<Uuid>,
    stored: &StoredUpload,
) -> AppResult<UploadedDocument> {
    let course_id =
        course_id.ok_or_else(|| AppError::BadRequest("Missing required field: courseId".into()))?;
    let module_id =
        module_id.ok_or_else(|| AppError::BadRequest("Missing required field: moduleId".into()))?;
    let lesson_id =
        lesson_id.ok_or_else(|| AppError::BadRequest("Missing required field: lessonId".into()))?;

    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", course_id)))?;

    let mut modules = course.modules.0;
    let document = LessonDocument {
        filename: stored.original_filename.clone(),
        filepath: stored.stored_name.clone(),
        uploaded_at: Utc::now(),
    };

    let replaced = {
        let module = modules
            .iter_mut()
            .find(|m| m.id == module_id)
            .ok_or_else(|| AppError::Core(CoreError::not_found("Module", module_id)))?;
        let lesson = module
            .lessons
            .iter_mut()
            .find(|l| l.id == lesson_id)
            .ok_or_else(|| AppError::Core(CoreError::not_found("Lesson", lesson_id)))?;

        let previous = lesson.document.take();
        lesson.document = Some(document.clone());
        previous
    };

    CourseRepo::store_modules(&state.pool, course_id, &modules).await?;
    state.cache.delete_pattern(CACHE_CLEAR_PATTERN).await;

    if let Some(previous) = replaced {
        let path = PathBuf::from(&state.config.upload_dir).join(&previous.filepath);
        let _ = tokio::fs::remove_file(path).await;
    }

    Ok(UploadedDocument {
        lesson_id,
        document,
    })
}

// ---------------------------------------------------------------------------
// Document summarization
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/summarize-document`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub course_id: DbId,
    pub module_id: Uuid,
    pub lesson_id: Uuid,
}

/// Payload for the summarization response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub lesson_title: String,
    pub document_name: String,
    pub summary: String,
}

/// POST /api/v1/admin/summarize-document
///
/// Resolve the lesson's document, delegate text extraction and
/// summarization to the external collaborators, and return the structured
/// summary. Fails when a collaborator is unconfigured or unreachable.
pub async fn summarize_document(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<SummarizeRequest>,
) -> AppResult<Json<DataResponse<DocumentSummary>>> {
    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", input.course_id)))?;

    let module = catalog::find_module(&course.modules.0, input.module_id)
        .ok_or_else(|| AppError::Core(CoreError::not_found("Module", input.module_id)))?;

    let lesson = module
        .lessons
        .iter()
        .find(|l| l.id == input.lesson_id)
        .ok_or_else(|| AppError::Core(CoreError::not_found("Lesson", input.lesson_id)))?;

    let document = lesson
        .document
        .as_ref()
        .ok_or_else(|| AppError::Core(CoreError::not_found("Document", input.lesson_id)))?;

    let path = PathBuf::from(&state.config.upload_dir).join(&document.filepath);
    let bytes = tokio::fs::read(&path).await.map_err(|_| {
        AppError::Core(CoreError::NotFound {
            entity: "Document file",
            id: document.filepath.clone(),
        })
    })?;

    let extractor = state
        .extractor
        .as_ref()
        .ok_or_else(|| AppError::Upstream("Text extraction service not configured".into()))?;
    let text = extractor
        .extract_text(bytes)
        .await
        .map_err(|e| AppError::Upstream(format!("Text extraction failed: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::BadRequest(
            "No text content found in document".into(),
        ));
    }

    let summarizer = state
        .summarizer
        .as_ref()
        .ok_or_else(|| AppError::Upstream("AI summarization service not configured".into()))?;
    let summary = summarizer
        .summarize(&build_prompt(&text))
        .await
        .map_err(|e| AppError::Upstream(format!("Summarization failed: {e}")))?;

    Ok(Json(DataResponse::new(DocumentSummary {
        lesson_title: lesson.title.clone(),
        document_name: document.filename.clone(),
        summary,
    })))
}
