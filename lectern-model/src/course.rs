use chrono::{DateTime, Utc};

use crate::error::{ModelError, Result};
use crate::ids::{CourseId, SubjectId, UserId};

/// Topic grouping for courses.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subject {
    pub id: SubjectId,
    pub title: String,
    pub slug: String,
}

impl Subject {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Result<Self> {
        let title = required("title", title.into())?;
        let slug = validate_slug(slug.into())?;
        Ok(Self {
            id: SubjectId::new(),
            title,
            slug,
        })
    }
}

/// Subject plus the number of courses filed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubjectSummary {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub subject: Subject,
    pub total_courses: u64,
}

/// A course authored by one instructor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Course {
    pub id: CourseId,
    pub owner: UserId,
    pub subject_id: SubjectId,
    pub title: String,
    pub slug: String,
    pub overview: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(owner: UserId, draft: CourseDraft) -> Result<Self> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: CourseId::new(),
            owner,
            subject_id: draft.subject_id,
            title: draft.title.trim().to_string(),
            slug: draft.slug.trim().to_string(),
            overview: draft.overview,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Replace the editable fields, keeping identity and ownership.
    pub fn apply(&mut self, draft: CourseDraft) -> Result<()> {
        draft.validate()?;
        self.subject_id = draft.subject_id;
        self.title = draft.title.trim().to_string();
        self.slug = draft.slug.trim().to_string();
        self.overview = draft.overview;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Editable course fields as submitted by an instructor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CourseDraft {
    pub subject_id: SubjectId,
    pub title: String,
    pub slug: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub overview: String,
}

impl CourseDraft {
    pub fn validate(&self) -> Result<()> {
        required("title", self.title.clone())?;
        validate_slug(self.slug.clone())?;
        Ok(())
    }
}

const MAX_TITLE_LEN: usize = 256;

pub(crate) fn required(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ModelError::validation(format!(
            "{field} must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_slug(slug: String) -> Result<String> {
    let slug = required("slug", slug)?;
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ModelError::validation(format!(
            "slug {slug:?} may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(slug: &str) -> CourseDraft {
        CourseDraft {
            subject_id: SubjectId::new(),
            title: "Intro to Rust".into(),
            slug: slug.into(),
            overview: String::new(),
        }
    }

    #[test]
    fn new_course_trims_fields() {
        let mut d = draft(" rust-101 ");
        d.title = "  Intro to Rust ".into();
        let course = Course::new(UserId::new(), d).unwrap();
        assert_eq!(course.title, "Intro to Rust");
        assert_eq!(course.slug, "rust-101");
    }

    #[test]
    fn slug_with_spaces_is_rejected() {
        assert!(Course::new(UserId::new(), draft("rust 101")).is_err());
    }

    #[test]
    fn empty_subject_title_is_rejected() {
        assert!(Subject::new("   ", "x").is_err());
    }
}
