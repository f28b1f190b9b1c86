//! Course entity model and DTOs.

use cursus_core::catalog::Module;
use cursus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Full course row from the `courses` table, module/lesson tree included.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub duration: String,
    pub thumbnail: String,
    /// Price in minor currency units (paise).
    pub price: i64,
    pub category: String,
    pub modules: Json<Vec<Module>>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a course. Module/lesson identifiers missing from the
/// submitted tree are filled in server-side before insert.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub instructor: Option<String>,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
    pub is_active: Option<bool>,
}

/// DTO for updating a course. Only non-`None` fields are applied; `modules`
/// replaces the whole embedded tree when present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub modules: Option<Vec<Module>>,
    pub is_active: Option<bool>,
}
