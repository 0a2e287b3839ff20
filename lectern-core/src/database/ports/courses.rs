use async_trait::async_trait;
use lectern_model::{Course, CourseId, Subject, SubjectId, SubjectSummary, UserId};

use crate::error::Result;

/// Subjects, courses and enrollment.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create_subject(&self, subject: &Subject) -> Result<()>;
    /// Subjects ordered by title, with the number of courses filed under each.
    async fn list_subjects(&self) -> Result<Vec<SubjectSummary>>;
    async fn subject_exists(&self, subject: SubjectId) -> Result<bool>;

    async fn create_course(&self, course: &Course) -> Result<()>;
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>>;
    /// Returns `false` when the course does not exist.
    async fn update_course(&self, course: &Course) -> Result<bool>;
    /// Remove the course together with its modules, contents and
    /// enrollments. Returns `false` when the course does not exist.
    async fn delete_course(&self, id: CourseId) -> Result<bool>;
    /// All courses, newest first.
    async fn list_courses(&self) -> Result<Vec<Course>>;
    /// Courses authored by `owner`, newest first.
    async fn list_owned(&self, owner: UserId) -> Result<Vec<Course>>;

    // Enrollment
    /// Idempotent; enrolling twice is not an error.
    async fn enroll(&self, course: CourseId, student: UserId) -> Result<()>;
    async fn is_enrolled(&self, course: CourseId, student: UserId) -> Result<bool>;
    /// Courses `student` is enrolled in, newest first.
    async fn list_enrolled(&self, student: UserId) -> Result<Vec<Course>>;
}
