use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lectern_model::{Course, CourseId, Subject, SubjectId, SubjectSummary, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::unique_violation;
use crate::database::ports::courses::CourseRepository;
use crate::error::{CoreError, Result};

const COURSE_COLUMNS: &str =
    "id, owner_id, subject_id, title, slug, overview, created_at, updated_at";

/// PostgreSQL-backed implementation of the `CourseRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_course(row: &PgRow) -> Result<Course> {
        let read = |column: &str, e: sqlx::Error| {
            CoreError::Internal(format!("Failed to read course {column}: {e}"))
        };
        Ok(Course {
            id: CourseId::from(row.try_get::<Uuid, _>("id").map_err(|e| read("id", e))?),
            owner: UserId::from(
                row.try_get::<Uuid, _>("owner_id")
                    .map_err(|e| read("owner_id", e))?,
            ),
            subject_id: SubjectId::from(
                row.try_get::<Uuid, _>("subject_id")
                    .map_err(|e| read("subject_id", e))?,
            ),
            title: row.try_get("title").map_err(|e| read("title", e))?,
            slug: row.try_get("slug").map_err(|e| read("slug", e))?,
            overview: row.try_get("overview").map_err(|e| read("overview", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| read("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| read("updated_at", e))?,
        })
    }

    async fn fetch_courses(&self, sql: &str, bind: Option<Uuid>) -> Result<Vec<Course>> {
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(self.pool())
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to list courses: {e}")))?;
        rows.iter().map(Self::map_course).collect()
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn create_subject(&self, subject: &Subject) -> Result<()> {
        sqlx::query("INSERT INTO subjects (id, title, slug) VALUES ($1, $2, $3)")
            .bind(subject.id.to_uuid())
            .bind(&subject.title)
            .bind(&subject.slug)
            .execute(self.pool())
            .await
            .map_err(|e| {
                unique_violation(e, || {
                    format!("subject slug {:?} is already taken", subject.slug)
                })
            })?;
        info!(subject_id = %subject.id, slug = %subject.slug, "subject created");
        Ok(())
    }

    async fn list_subjects(&self) -> Result<Vec<SubjectSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.title, s.slug, COUNT(c.id) AS total_courses
            FROM subjects s
            LEFT JOIN courses c ON c.subject_id = s.id
            GROUP BY s.id, s.title, s.slug
            ORDER BY s.title
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to list subjects: {e}")))?;

        rows.iter()
            .map(|row| -> Result<SubjectSummary> {
                let total: i64 = row.try_get("total_courses")?;
                Ok(SubjectSummary {
                    subject: Subject {
                        id: SubjectId::from(row.try_get::<Uuid, _>("id")?),
                        title: row.try_get("title")?,
                        slug: row.try_get("slug")?,
                    },
                    total_courses: total.max(0) as u64,
                })
            })
            .collect()
    }

    async fn subject_exists(&self, subject: SubjectId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
                .bind(subject.to_uuid())
                .fetch_one(self.pool())
                .await?;
        Ok(exists)
    }

    async fn create_course(&self, course: &Course) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, owner_id, subject_id, title, slug, overview, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(course.id.to_uuid())
        .bind(course.owner.to_uuid())
        .bind(course.subject_id.to_uuid())
        .bind(&course.title)
        .bind(&course.slug)
        .bind(&course.overview)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            unique_violation(e, || format!("course slug {:?} is already taken", course.slug))
        })?;
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
        let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to load course {id}: {e}")))?;
        row.as_ref().map(Self::map_course).transpose()
    }

    async fn update_course(&self, course: &Course) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET subject_id = $2, title = $3, slug = $4, overview = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(course.id.to_uuid())
        .bind(course.subject_id.to_uuid())
        .bind(&course.title)
        .bind(&course.slug)
        .bind(&course.overview)
        .bind(course.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            unique_violation(e, || format!("course slug {:?} is already taken", course.slug))
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool> {
        // modules, contents and enrollments go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.to_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to delete course {id}: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.fetch_courses(
            &format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC, id DESC"),
            None,
        )
        .await
    }

    async fn list_owned(&self, owner: UserId) -> Result<Vec<Course>> {
        self.fetch_courses(
            &format!(
                "SELECT {COURSE_COLUMNS} FROM courses WHERE owner_id = $1 \
                 ORDER BY created_at DESC, id DESC"
            ),
            Some(owner.to_uuid()),
        )
        .await
    }

    async fn enroll(&self, course: CourseId, student: UserId) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO course_students (course_id, student_id)
            SELECT id, $2 FROM courses WHERE id = $1
            ON CONFLICT (course_id, student_id) DO NOTHING
            "#,
        )
        .bind(course.to_uuid())
        .bind(student.to_uuid())
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to enroll {student} in {course}: {e}")))?;

        if result.rows_affected() == 0 && self.get_course(course).await?.is_none() {
            return Err(CoreError::not_found(format!("course {course}")));
        }
        Ok(())
    }

    async fn is_enrolled(&self, course: CourseId, student: UserId) -> Result<bool> {
        let enrolled: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM course_students WHERE course_id = $1 AND student_id = $2)",
        )
        .bind(course.to_uuid())
        .bind(student.to_uuid())
        .fetch_one(self.pool())
        .await?;
        Ok(enrolled)
    }

    async fn list_enrolled(&self, student: UserId) -> Result<Vec<Course>> {
        self.fetch_courses(
            r#"
            SELECT c.id, c.owner_id, c.subject_id, c.title, c.slug, c.overview,
                   c.created_at, c.updated_at
            FROM courses c
            JOIN course_students cs ON cs.course_id = c.id
            WHERE cs.student_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
            Some(student.to_uuid()),
        )
        .await
    }
}
