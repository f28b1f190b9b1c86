//! Enrollment and progress tracking.
//!
//! An enrollment links a user to a course and owns the per-lesson progress
//! entries by composition. The whole `Vec<Enrollment>` is persisted as one
//! JSONB document on the user row, so all mutation here is pure in-memory
//! manipulation; the repository layer is responsible for the single-document
//! write.
//!
//! Invariants maintained by this module:
//! - at most one enrollment per (user, course) pair
//! - at most one progress entry per (module, lesson) pair
//! - `completion_percentage` is always in [0, 100] and is 0 for courses
//!   with no lessons

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DbId, Timestamp};

/// A record that a specific lesson within a specific module has been
/// completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub module_id: Uuid,
    pub lesson_id: Uuid,
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

/// The relationship between a user and a course, including payment linkage
/// and progress state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub course_id: DbId,
    pub enrolled_at: Timestamp,
    #[serde(default)]
    pub payment_id: Option<DbId>,
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
    /// Cached ratio of completed lessons to total lessons, 0-100.
    #[serde(default)]
    pub completion_percentage: i32,
}

impl Enrollment {
    /// Build a fresh enrollment with empty progress.
    pub fn new(course_id: DbId, payment_id: Option<DbId>, now: Timestamp) -> Self {
        Enrollment {
            course_id,
            enrolled_at: now,
            payment_id,
            progress: Vec::new(),
            completion_percentage: 0,
        }
    }

    /// Count of progress entries marked completed.
    pub fn completed_lessons(&self) -> usize {
        self.progress.iter().filter(|p| p.completed).count()
    }
}

/// Find a user's enrollment for a course.
pub fn find_enrollment(enrollments: &[Enrollment], course_id: DbId) -> Option<&Enrollment> {
    enrollments.iter().find(|e| e.course_id == course_id)
}

/// Mutable variant of [`find_enrollment`].
pub fn find_enrollment_mut(
    enrollments: &mut [Enrollment],
    course_id: DbId,
) -> Option<&mut Enrollment> {
    enrollments.iter_mut().find(|e| e.course_id == course_id)
}

/// Whether the user is already enrolled in the course.
pub fn is_enrolled(enrollments: &[Enrollment], course_id: DbId) -> bool {
    find_enrollment(enrollments, course_id).is_some()
}

/// Upsert a completed-lesson mark into a progress list.
///
/// If an entry for the (module, lesson) pair exists it is overwritten in
/// place (completed flag and timestamp); otherwise a new entry is appended.
/// Repeated calls are idempotent in cardinality though not in timestamp.
pub fn mark_lesson_complete(
    progress: &mut Vec<ProgressEntry>,
    module_id: Uuid,
    lesson_id: Uuid,
    now: Timestamp,
) {
    match progress
        .iter_mut()
        .find(|p| p.module_id == module_id && p.lesson_id == lesson_id)
    {
        Some(entry) => {
            entry.completed = true;
            entry.completed_at = Some(now);
        }
        None => progress.push(ProgressEntry {
            module_id,
            lesson_id,
            completed: true,
            completed_at: Some(now),
        }),
    }
}

/// Completion percentage for `completed` lessons out of `total`.
///
/// Rounded to the nearest integer and clamped to [0, 100]. A course with no
/// lessons is defined as 0% complete; the division-by-zero guard is
/// deliberate, not decorative.
pub fn completion_percentage(completed: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let pct = (100.0 * completed as f64 / total as f64).round() as i32;
    pct.clamp(0, 100)
}

/// Completion percentage for a fractional completed-lesson count.
///
/// Used by analytics, where the completed count is an average across
/// enrollments. Same rounding, clamping, and zero-lesson guard as
/// [`completion_percentage`].
pub fn average_completion_percentage(avg_completed: f64, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let pct = (100.0 * avg_completed / total as f64).round() as i32;
    pct.clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ids() -> (Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn percentage_zero_lessons_is_zero() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(5, 0), 0);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        // 1/3 -> 33.33 -> 33; 2/3 -> 66.67 -> 67
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
    }

    #[test]
    fn percentage_full_course_is_exactly_100() {
        assert_eq!(completion_percentage(4, 4), 100);
        assert_eq!(completion_percentage(7, 7), 100);
    }

    #[test]
    fn percentage_clamps_overcount() {
        // More completed entries than lessons (e.g. lessons removed from the
        // course after completion) must not exceed 100.
        assert_eq!(completion_percentage(5, 4), 100);
    }

    #[test]
    fn percentage_quarter_steps() {
        // Course with 2 modules of 2 lessons each: 4 total.
        assert_eq!(completion_percentage(1, 4), 25);
        assert_eq!(completion_percentage(2, 4), 50);
        assert_eq!(completion_percentage(3, 4), 75);
        assert_eq!(completion_percentage(4, 4), 100);
    }

    #[test]
    fn average_percentage_handles_fractions_and_zero() {
        assert_eq!(average_completion_percentage(1.5, 4), 38); // 37.5 rounds up
        assert_eq!(average_completion_percentage(0.0, 4), 0);
        assert_eq!(average_completion_percentage(2.0, 0), 0);
        assert_eq!(average_completion_percentage(9.0, 4), 100);
    }

    #[test]
    fn mark_lesson_complete_appends_once() {
        let (module_id, lesson_id) = ids();
        let mut progress = Vec::new();

        mark_lesson_complete(&mut progress, module_id, lesson_id, Utc::now());
        assert_eq!(progress.len(), 1);
        assert!(progress[0].completed);
    }

    #[test]
    fn mark_lesson_complete_is_idempotent_in_cardinality() {
        let (module_id, lesson_id) = ids();
        let mut progress = Vec::new();

        for _ in 0..5 {
            mark_lesson_complete(&mut progress, module_id, lesson_id, Utc::now());
        }
        assert_eq!(progress.len(), 1);
        assert!(progress[0].completed);
    }

    #[test]
    fn mark_lesson_complete_distinguishes_pairs() {
        let module_id = Uuid::new_v4();
        let lesson_a = Uuid::new_v4();
        let lesson_b = Uuid::new_v4();
        let mut progress = Vec::new();

        mark_lesson_complete(&mut progress, module_id, lesson_a, Utc::now());
        mark_lesson_complete(&mut progress, module_id, lesson_b, Utc::now());
        // Same lesson id under a different module is a distinct pair.
        let other_module = Uuid::new_v4();
        mark_lesson_complete(&mut progress, other_module, lesson_a, Utc::now());

        assert_eq!(progress.len(), 3);
    }

    #[test]
    fn mark_lesson_complete_overwrites_timestamp() {
        let (module_id, lesson_id) = ids();
        let mut progress = Vec::new();

        let first = Utc::now();
        mark_lesson_complete(&mut progress, module_id, lesson_id, first);
        let second = first + chrono::Duration::seconds(90);
        mark_lesson_complete(&mut progress, module_id, lesson_id, second);

        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].completed_at, Some(second));
    }

    #[test]
    fn find_enrollment_matches_course() {
        let now = Utc::now();
        let enrollments = vec![Enrollment::new(1, None, now), Enrollment::new(2, Some(9), now)];

        assert!(is_enrolled(&enrollments, 1));
        assert!(is_enrolled(&enrollments, 2));
        assert!(!is_enrolled(&enrollments, 3));
        assert_eq!(find_enrollment(&enrollments, 2).unwrap().payment_id, Some(9));
    }

    #[test]
    fn completed_lessons_ignores_incomplete_entries() {
        let now = Utc::now();
        let mut e = Enrollment::new(1, None, now);
        e.progress.push(ProgressEntry {
            module_id: Uuid::new_v4(),
            lesson_id: Uuid::new_v4(),
            completed: false,
            completed_at: None,
        });
        mark_lesson_complete(&mut e.progress, Uuid::new_v4(), Uuid::new_v4(), now);

        assert_eq!(e.progress.len(), 2);
        assert_eq!(e.completed_lessons(), 1);
    }
}
