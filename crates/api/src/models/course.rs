//! Course domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use campfinder_core::{BootcampId, Career, CourseId, FieldPatch, MinimumSkill, UserId};

/// A course taught at a bootcamp.
#[derive(Debug, Clone)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    /// Free-form duration, e.g. `"12"`.
    pub weeks: String,
    pub tuition: Decimal,
    pub minimum_skill: MinimumSkill,
    pub scholarship_available: bool,
    /// Between 1 and 4.
    pub credits: i32,
    /// One of the parent bootcamp's careers.
    pub subject: Career,
    pub bootcamp: BootcampId,
    /// Enrolled users, without duplicates.
    pub students: Vec<UserId>,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Returns `true` if the user is enrolled.
    #[must_use]
    pub fn has_student(&self, user_id: UserId) -> bool {
        self.students.contains(&user_id)
    }
}

/// Caller-editable course fields before validation.
#[derive(Debug, Clone, Default)]
pub struct CourseDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<String>,
    pub tuition: Option<Decimal>,
    pub minimum_skill: Option<MinimumSkill>,
    pub scholarship_available: Option<bool>,
    pub credits: Option<i32>,
    pub subject: Option<Career>,
}

impl CourseDraft {
    /// Working copy of a stored course.
    #[must_use]
    pub fn from_existing(course: &Course) -> Self {
        Self {
            title: Some(course.title.clone()),
            description: Some(course.description.clone()),
            weeks: Some(course.weeks.clone()),
            tuition: Some(course.tuition),
            minimum_skill: Some(course.minimum_skill),
            scholarship_available: Some(course.scholarship_available),
            credits: Some(course.credits),
            subject: Some(course.subject),
        }
    }

    /// Apply a partial update.
    #[must_use]
    pub fn apply(mut self, patch: CoursePatch) -> Self {
        patch.title.apply_to(&mut self.title);
        patch.description.apply_to(&mut self.description);
        patch.weeks.apply_to(&mut self.weeks);
        patch.tuition.apply_to(&mut self.tuition);
        patch.minimum_skill.apply_to(&mut self.minimum_skill);
        patch
            .scholarship_available
            .apply_to(&mut self.scholarship_available);
        patch.credits.apply_to(&mut self.credits);
        patch.subject.apply_to(&mut self.subject);
        self
    }
}

/// Creation payload: the draft plus the parent bootcamp.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub bootcamp: BootcampId,
    pub draft: CourseDraft,
}

/// Partial course update. The parent bootcamp cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct CoursePatch {
    pub title: FieldPatch<String>,
    pub description: FieldPatch<String>,
    pub weeks: FieldPatch<String>,
    pub tuition: FieldPatch<Decimal>,
    pub minimum_skill: FieldPatch<MinimumSkill>,
    pub scholarship_available: FieldPatch<bool>,
    pub credits: FieldPatch<i32>,
    pub subject: FieldPatch<Career>,
}

/// Validated course fields written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: Decimal,
    pub minimum_skill: MinimumSkill,
    pub scholarship_available: bool,
    pub credits: i32,
    pub subject: Career,
}
