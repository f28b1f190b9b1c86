//! Course catalog value objects.
//!
//! A course aggregate owns its modules by composition, and each module owns
//! its lessons. The trees are persisted as a single JSONB document per
//! course, so every type here is plain serde data. Module and lesson
//! identifiers are server-generated UUIDs; cross-aggregate references always
//! use identifiers, never live references.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Valid course category names, matching the catalog taxonomy.
pub const CATEGORIES: &[&str] = &[
    "finance",
    "technology",
    "analytics",
    "marketing",
    "management",
];

/// Default category assigned when a course is created without one.
pub const DEFAULT_CATEGORY: &str = "technology";

/// Default course price in minor currency units (paise).
pub const DEFAULT_PRICE: i64 = 50000;

/// Default currency for course pricing and payments.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Validate a category name against the known taxonomy.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown category '{category}'. Valid categories: {}",
            CATEGORIES.join(", ")
        )))
    }
}

/// A document attached to a lesson (uploaded course material).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDocument {
    /// Original filename as uploaded.
    pub filename: String,
    /// Storage path relative to the upload directory.
    pub filepath: String,
    pub uploaded_at: Timestamp,
}

/// A single lesson within a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Server-generated identifier, stable across course edits.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_url: String,
    #[serde(default)]
    pub duration: String,
    /// Display order. Author-controlled; not validated for uniqueness
    /// or contiguity.
    pub order: i32,
    #[serde(default)]
    pub document: Option<LessonDocument>,
}

/// A module grouping an ordered list of lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Server-generated identifier, stable across course edits.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Display order. Author-controlled; not validated.
    pub order: i32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Total lesson count across all modules of a course.
pub fn total_lessons(modules: &[Module]) -> usize {
    modules.iter().map(|m| m.lessons.len()).sum()
}

/// Find a module by id.
pub fn find_module<'a>(modules: &'a [Module], module_id: Uuid) -> Option<&'a Module> {
    modules.iter().find(|m| m.id == module_id)
}

/// Find a lesson by (module, lesson) id pair.
pub fn find_lesson<'a>(
    modules: &'a [Module],
    module_id: Uuid,
    lesson_id: Uuid,
) -> Option<&'a Lesson> {
    find_module(modules, module_id)?
        .lessons
        .iter()
        .find(|l| l.id == lesson_id)
}

/// Check that a (module, lesson) pair exists in the course structure.
///
/// Progress may only be recorded against lessons the course actually
/// contains; mismatched identifiers are a validation error, not a silent
/// success.
pub fn validate_membership(
    modules: &[Module],
    module_id: Uuid,
    lesson_id: Uuid,
) -> Result<(), CoreError> {
    if find_lesson(modules, module_id, lesson_id).is_some() {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Lesson does not belong to this course".into(),
        ))
    }
}
