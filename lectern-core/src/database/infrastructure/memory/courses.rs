use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use lectern_model::{Course, CourseId, Subject, SubjectId, SubjectSummary, UserId};
use tokio::sync::Mutex;

use crate::database::ports::courses::CourseRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Default)]
struct State {
    subjects: HashMap<SubjectId, Subject>,
    courses: HashMap<CourseId, Course>,
    enrollments: HashSet<(CourseId, UserId)>,
}

/// Process-local [`CourseRepository`].
#[derive(Debug, Default)]
pub struct InMemoryCourseRepository {
    state: Mutex<State>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut courses: Vec<Course>) -> Vec<Course> {
    courses.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    courses
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create_subject(&self, subject: &Subject) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.subjects.values().any(|s| s.slug == subject.slug) {
            return Err(CoreError::InvalidInput(format!(
                "subject slug {:?} is already taken",
                subject.slug
            )));
        }
        state.subjects.insert(subject.id, subject.clone());
        Ok(())
    }

    async fn list_subjects(&self) -> Result<Vec<SubjectSummary>> {
        let state = self.state.lock().await;
        let mut summaries: Vec<SubjectSummary> = state
            .subjects
            .values()
            .map(|subject| SubjectSummary {
                subject: subject.clone(),
                total_courses: state
                    .courses
                    .values()
                    .filter(|c| c.subject_id == subject.id)
                    .count() as u64,
            })
            .collect();
        summaries.sort_by(|a, b| a.subject.title.cmp(&b.subject.title));
        Ok(summaries)
    }

    async fn subject_exists(&self, subject: SubjectId) -> Result<bool> {
        Ok(self.state.lock().await.subjects.contains_key(&subject))
    }

    async fn create_course(&self, course: &Course) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.courses.values().any(|c| c.slug == course.slug) {
            return Err(CoreError::InvalidInput(format!(
                "course slug {:?} is already taken",
                course.slug
            )));
        }
        state.courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.state.lock().await.courses.get(&id).cloned())
    }

    async fn update_course(&self, course: &Course) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state
            .courses
            .values()
            .any(|c| c.slug == course.slug && c.id != course.id)
        {
            return Err(CoreError::InvalidInput(format!(
                "course slug {:?} is already taken",
                course.slug
            )));
        }
        match state.courses.get_mut(&course.id) {
            Some(existing) => {
                *existing = course.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.enrollments.retain(|(course, _)| *course != id);
        Ok(state.courses.remove(&id).is_some())
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        let state = self.state.lock().await;
        Ok(newest_first(state.courses.values().cloned().collect()))
    }

    async fn list_owned(&self, owner: UserId) -> Result<Vec<Course>> {
        let state = self.state.lock().await;
        Ok(newest_first(
            state
                .courses
                .values()
                .filter(|c| c.owner == owner)
                .cloned()
                .collect(),
        ))
    }

    async fn enroll(&self, course: CourseId, student: UserId) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.courses.contains_key(&course) {
            return Err(CoreError::not_found(format!("course {course}")));
        }
        state.enrollments.insert((course, student));
        Ok(())
    }

    async fn is_enrolled(&self, course: CourseId, student: UserId) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .await
            .enrollments
            .contains(&(course, student)))
    }

    async fn list_enrolled(&self, student: UserId) -> Result<Vec<Course>> {
        let state = self.state.lock().await;
        Ok(newest_first(
            state
                .enrollments
                .iter()
                .filter(|(_, s)| *s == student)
                .filter_map(|(course, _)| state.courses.get(course).cloned())
                .collect(),
        ))
    }
}
