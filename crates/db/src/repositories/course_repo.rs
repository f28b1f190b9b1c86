//! Repository for the `courses` table.

use cursus_core::catalog::{self, Module};
use cursus_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, instructor, duration, thumbnail, price, \
                       category, modules, is_active, created_at, updated_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (title, description, instructor, duration, thumbnail, price, category, modules, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.instructor.as_deref().unwrap_or("Cursus Academy"))
            .bind(input.duration.as_deref().unwrap_or(""))
            .bind(input.thumbnail.as_deref().unwrap_or(""))
            .bind(input.price.unwrap_or(catalog::DEFAULT_PRICE))
            .bind(input.category.as_deref().unwrap_or(catalog::DEFAULT_CATEGORY))
            .bind(Json(&input.modules))
            .bind(input.is_active.unwrap_or(true))
            .fetch_one(pool)
            .await
    }

    /// Find a course by ID, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active courses for the public catalog.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE is_active = true ORDER BY created_at DESC");
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// List all courses for the admin console, inactive included.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses ORDER BY created_at DESC");
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// Update a course. Only non-`None` fields in `input` are applied; a
    /// present `modules` replaces the whole embedded tree.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                instructor = COALESCE($4, instructor),
                duration = COALESCE($5, duration),
                thumbnail = COALESCE($6, thumbnail),
                price = COALESCE($7, price),
                category = COALESCE($8, category),
                modules = COALESCE($9, modules),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.instructor)
            .bind(&input.duration)
            .bind(&input.thumbnail)
            .bind(input.price)
            .bind(&input.category)
            .bind(input.modules.as_ref().map(Json))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Replace the embedded module/lesson tree (document attach/detach).
    ///
    /// Returns `true` if the row was updated.
    pub async fn store_modules(
        pool: &PgPool,
        id: DbId,
        modules: &[Module],
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE courses SET modules = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(Json(modules))
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a course, returning the deleted row so the caller can clean
    /// up attached lesson documents on disk.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("DELETE FROM courses WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
