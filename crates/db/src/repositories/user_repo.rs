//! Repository for the `users` table.
//!
//! The enrollment/progress tree lives in the `enrollments` JSONB column and
//! is always written whole. Flows that read-modify-write it (enroll,
//! progress updates) must go through [`UserRepo::find_by_id_for_update`] /
//! [`UserRepo::store_enrollments`] inside one transaction so the row lock
//! serializes concurrent updates for the same user.

use cursus_core::enrollment::Enrollment;
use cursus_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, enrollments, created_at, updated_at";

/// Provides CRUD and enrollment-document operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercased; the caller is
    /// expected to lowercase the lookup value.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a user row with a `FOR UPDATE` lock.
    ///
    /// Holds the row lock for the rest of the transaction, serializing
    /// concurrent enrollment/progress writes for this user.
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Replace the user's whole enrollment document in one write.
    pub async fn store_enrollments(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        enrollments: &[Enrollment],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET enrollments = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(Json(enrollments))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false, updated_at = NOW() WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
