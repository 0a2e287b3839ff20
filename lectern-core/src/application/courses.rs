use std::sync::Arc;

use futures::future::try_join_all;
use lectern_model::{
    Content, ContentId, ContentItem, ContentKind, Course, CourseDraft, CourseId, ItemFields,
    Module, ModuleDraft, ModuleId, Subject, SubjectSummary, UserId,
};
use serde_json::Value;
use tracing::{info, instrument};

use super::ownership::{CourseOwnership, ModuleOwnership};
use super::unit_of_work::AppUnitOfWork;
use super::views::{CourseWithContents, ModuleWithContents, RenderedContent, StudentCourseView};
use crate::error::{CoreError, Result};
use crate::ordering::{
    OrderedList, PositionSequencer, ReorderBatch, ReorderOutcome, SequencerSettings,
    content_scope, module_scope,
};

/// Course authoring and consumption on top of the repository ports.
///
/// Modules are sequenced per course and contents per module; both
/// sequencers restrict reorders to the course author.
#[derive(Clone, Debug)]
pub struct CourseService {
    uow: AppUnitOfWork,
    modules: PositionSequencer<Module>,
    contents: PositionSequencer<Content>,
}

impl CourseService {
    pub fn new(uow: AppUnitOfWork, settings: SequencerSettings) -> Self {
        let modules = PositionSequencer::new(
            Arc::clone(&uow.modules),
            module_scope(),
            Arc::new(CourseOwnership::new(Arc::clone(&uow.courses))),
        )
        .with_settings(settings);
        let contents = PositionSequencer::new(
            Arc::clone(&uow.contents),
            content_scope(),
            Arc::new(ModuleOwnership::new(
                Arc::clone(&uow.modules),
                Arc::clone(&uow.courses),
            )),
        )
        .with_settings(settings);

        Self {
            uow,
            modules,
            contents,
        }
    }

    pub fn unit_of_work(&self) -> &AppUnitOfWork {
        &self.uow
    }

    // Subjects

    pub async fn create_subject(&self, title: String, slug: String) -> Result<Subject> {
        let subject = Subject::new(title, slug)?;
        self.uow.courses.create_subject(&subject).await?;
        Ok(subject)
    }

    pub async fn list_subjects(&self) -> Result<Vec<SubjectSummary>> {
        self.uow.courses.list_subjects().await
    }

    // Courses

    pub async fn create_course(&self, actor: UserId, draft: CourseDraft) -> Result<Course> {
        self.require_subject(&draft).await?;
        let course = Course::new(actor, draft)?;
        self.uow.courses.create_course(&course).await?;
        info!(course_id = %course.id, owner = %actor, "course created");
        Ok(course)
    }

    pub async fn get_course(&self, id: CourseId) -> Result<Course> {
        self.uow
            .courses
            .get_course(id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("course {id}")))
    }

    pub async fn update_course(
        &self,
        id: CourseId,
        draft: CourseDraft,
        actor: UserId,
    ) -> Result<Course> {
        let mut course = self.owned_course(id, actor).await?;
        self.require_subject(&draft).await?;
        course.apply(draft)?;
        if !self.uow.courses.update_course(&course).await? {
            return Err(CoreError::not_found(format!("course {id}")));
        }
        Ok(course)
    }

    /// Delete a course with its modules and their contents.
    #[instrument(skip(self), err)]
    pub async fn delete_course(&self, id: CourseId, actor: UserId) -> Result<()> {
        self.owned_course(id, actor).await?;

        let mut removed_contents = 0;
        for module in self.uow.modules.list_in_scope(&id).await? {
            removed_contents += self.uow.contents.delete_scope(&module.id).await?;
        }
        let removed_modules = self.uow.modules.delete_scope(&id).await?;
        self.uow.courses.delete_course(id).await?;

        info!(removed_modules, removed_contents, "course deleted");
        Ok(())
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        self.uow.courses.list_courses().await
    }

    pub async fn list_owned_courses(&self, actor: UserId) -> Result<Vec<Course>> {
        self.uow.courses.list_owned(actor).await
    }

    // Modules

    pub async fn create_module(
        &self,
        course_id: CourseId,
        draft: ModuleDraft,
        actor: UserId,
    ) -> Result<Module> {
        self.owned_course(course_id, actor).await?;
        let module = self.modules.create(Module::new(course_id, draft)?).await?;
        info!(
            module_id = %module.id,
            %course_id,
            position = ?module.position,
            "module created"
        );
        Ok(module)
    }

    /// Edit title and description. The position only changes through
    /// [`CourseService::reorder_modules`].
    pub async fn update_module(
        &self,
        id: ModuleId,
        title: String,
        description: String,
        actor: UserId,
    ) -> Result<Module> {
        let mut module = self.owned_module(id, actor).await?;
        module.apply(title, description)?;
        if !self.uow.modules.update_fields(&module).await? {
            return Err(CoreError::not_found(format!("module {id}")));
        }
        Ok(module)
    }

    pub async fn delete_module(&self, id: ModuleId, actor: UserId) -> Result<()> {
        self.owned_module(id, actor).await?;
        let removed_contents = self.uow.contents.delete_scope(&id).await?;
        self.uow.modules.delete(id).await?;
        info!(module_id = %id, removed_contents, "module deleted");
        Ok(())
    }

    pub async fn list_modules(&self, course_id: CourseId) -> Result<OrderedList<Module>> {
        self.modules.list_ordered(&course_id).await
    }

    /// Apply a drag-and-drop payload (`{"<module id>": position, ...}`).
    pub async fn reorder_modules(
        &self,
        payload: &Value,
        actor: UserId,
    ) -> Result<ReorderOutcome<ModuleId>> {
        let batch = ReorderBatch::from_json(payload)?;
        self.modules.reorder_batch(&batch, actor).await
    }

    // Contents

    pub async fn create_content(
        &self,
        module_id: ModuleId,
        kind: ContentKind,
        fields: ItemFields,
        actor: UserId,
    ) -> Result<Content> {
        self.owned_module(module_id, actor).await?;
        let item = ContentItem::build(kind, actor, fields)?;
        let content = self.contents.create(Content::new(module_id, item)).await?;
        info!(
            content_id = %content.id,
            %module_id,
            %kind,
            position = ?content.position,
            "content created"
        );
        Ok(content)
    }

    /// Edit the item of a content slot. The caller must own both the course
    /// and the item.
    pub async fn update_content_item(
        &self,
        id: ContentId,
        fields: ItemFields,
        actor: UserId,
    ) -> Result<Content> {
        let mut content = self.find_content(id).await?;
        self.owned_module(content.module_id, actor).await?;
        if content.item.owner() != actor {
            return Err(CoreError::forbidden(format!(
                "content {id} is not owned by {actor}"
            )));
        }
        content.item.apply(fields)?;
        if !self.uow.contents.update_fields(&content).await? {
            return Err(CoreError::not_found(format!("content {id}")));
        }
        Ok(content)
    }

    pub async fn delete_content(&self, id: ContentId, actor: UserId) -> Result<()> {
        let content = self.find_content(id).await?;
        self.owned_module(content.module_id, actor).await?;
        self.uow.contents.delete(id).await?;
        info!(content_id = %id, "content deleted");
        Ok(())
    }

    /// Rendered contents of a module, visible to the course author and to
    /// enrolled students.
    pub async fn list_contents_for(
        &self,
        module_id: ModuleId,
        actor: UserId,
    ) -> Result<Vec<RenderedContent>> {
        let module = self.find_module(module_id).await?;
        let course = self.get_course(module.course_id).await?;
        if !course.is_owned_by(actor) && !self.uow.courses.is_enrolled(course.id, actor).await? {
            return Err(CoreError::forbidden(format!(
                "{actor} may not read module {module_id}"
            )));
        }
        self.list_contents(module_id).await
    }

    pub async fn list_contents(&self, module_id: ModuleId) -> Result<Vec<RenderedContent>> {
        let contents = self.contents.list_ordered(&module_id).await?;
        Ok(contents.iter().map(RenderedContent::from).collect())
    }

    /// Apply a drag-and-drop payload (`{"<content id>": position, ...}`).
    pub async fn reorder_contents(
        &self,
        payload: &Value,
        actor: UserId,
    ) -> Result<ReorderOutcome<ContentId>> {
        let batch = ReorderBatch::from_json(payload)?;
        self.contents.reorder_batch(&batch, actor).await
    }

    // Enrollment

    pub async fn enroll(&self, course_id: CourseId, student: UserId) -> Result<Course> {
        let course = self.get_course(course_id).await?;
        self.uow.courses.enroll(course_id, student).await?;
        info!(%course_id, %student, "student enrolled");
        Ok(course)
    }

    pub async fn list_enrolled_courses(&self, student: UserId) -> Result<Vec<Course>> {
        self.uow.courses.list_enrolled(student).await
    }

    /// The course with its ordered modules, each with its ordered and
    /// rendered contents. Enrolled students only.
    pub async fn course_contents(
        &self,
        course_id: CourseId,
        student: UserId,
    ) -> Result<CourseWithContents> {
        let course = self.enrolled_course(course_id, student).await?;
        let modules = try_join_all(
            self.list_modules(course_id)
                .await?
                .into_iter()
                .map(|module| self.module_with_contents(module)),
        )
        .await?;
        Ok(CourseWithContents { course, modules })
    }

    /// The requested module of an enrolled course, or its first module when
    /// none is requested.
    pub async fn student_module(
        &self,
        course_id: CourseId,
        module_id: Option<ModuleId>,
        student: UserId,
    ) -> Result<StudentCourseView> {
        let course = self.enrolled_course(course_id, student).await?;
        let modules = self.list_modules(course_id).await?.into_vec();

        let selected = match module_id {
            Some(id) => Some(
                modules
                    .iter()
                    .find(|m| m.id == id)
                    .cloned()
                    .ok_or_else(|| {
                        CoreError::not_found(format!("module {id} in course {course_id}"))
                    })?,
            ),
            None => modules.first().cloned(),
        };
        let current = match selected {
            Some(module) => Some(self.module_with_contents(module).await?),
            None => None,
        };

        Ok(StudentCourseView {
            course,
            modules,
            current,
        })
    }

    async fn module_with_contents(&self, module: Module) -> Result<ModuleWithContents> {
        let contents = self.list_contents(module.id).await?;
        Ok(ModuleWithContents { module, contents })
    }

    async fn enrolled_course(&self, course_id: CourseId, student: UserId) -> Result<Course> {
        let course = self.get_course(course_id).await?;
        if !self.uow.courses.is_enrolled(course_id, student).await? {
            return Err(CoreError::forbidden(format!(
                "{student} is not enrolled in course {course_id}"
            )));
        }
        Ok(course)
    }

    async fn owned_course(&self, id: CourseId, actor: UserId) -> Result<Course> {
        let course = self.get_course(id).await?;
        if !course.is_owned_by(actor) {
            return Err(CoreError::forbidden(format!(
                "course {id} is not owned by {actor}"
            )));
        }
        Ok(course)
    }

    async fn owned_module(&self, id: ModuleId, actor: UserId) -> Result<Module> {
        let module = self.find_module(id).await?;
        self.owned_course(module.course_id, actor).await?;
        Ok(module)
    }

    async fn find_module(&self, id: ModuleId) -> Result<Module> {
        self.uow
            .modules
            .find(id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("module {id}")))
    }

    async fn find_content(&self, id: ContentId) -> Result<Content> {
        self.uow
            .contents
            .find(id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("content {id}")))
    }

    async fn require_subject(&self, draft: &CourseDraft) -> Result<()> {
        if !self.uow.courses.subject_exists(draft.subject_id).await? {
            return Err(CoreError::InvalidInput(format!(
                "unknown subject {}",
                draft.subject_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::Position;
    use serde_json::json;

    struct Setup {
        service: CourseService,
        author: UserId,
        course: Course,
    }

    async fn setup() -> Setup {
        let service = CourseService::new(AppUnitOfWork::in_memory(), SequencerSettings::default());
        let author = UserId::new();
        let subject = service
            .create_subject("Programming".into(), "programming".into())
            .await
            .unwrap();
        let course = service
            .create_course(
                author,
                CourseDraft {
                    subject_id: subject.id,
                    title: "Rust".into(),
                    slug: "rust".into(),
                    overview: String::new(),
                },
            )
            .await
            .unwrap();
        Setup {
            service,
            author,
            course,
        }
    }

    fn module(title: &str) -> ModuleDraft {
        ModuleDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    fn text(title: &str, body: &str) -> ItemFields {
        ItemFields {
            title: title.into(),
            content: Some(body.into()),
            ..Default::default()
        }
    }

    fn titles(modules: &OrderedList<Module>) -> Vec<&str> {
        modules.iter().map(|m| m.title.as_str()).collect()
    }

    #[tokio::test]
    async fn modules_are_sequenced_per_course_and_reorderable() {
        let s = setup().await;
        let a = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        let b = s
            .service
            .create_module(s.course.id, module("B"), s.author)
            .await
            .unwrap();
        assert_eq!(a.position, Some(Position::first()));
        assert_eq!(b.position, Some(Position::new(1).unwrap()));

        let payload = json!({ (a.id.to_string()): 1, (b.id.to_string()): 0 });
        s.service.reorder_modules(&payload, s.author).await.unwrap();

        let listed = s.service.list_modules(s.course.id).await.unwrap();
        assert_eq!(titles(&listed), ["B", "A"]);
    }

    #[tokio::test]
    async fn strangers_cannot_add_modules() {
        let s = setup().await;
        let err = s
            .service
            .create_module(s.course.id, module("A"), UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn stranger_reorder_is_acknowledged_but_ignored() {
        let s = setup().await;
        let a = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();

        let payload = json!({ (a.id.to_string()): 40 });
        let outcome = s
            .service
            .reorder_modules(&payload, UserId::new())
            .await
            .unwrap();
        assert!(outcome.applied.is_empty());

        let listed = s.service.list_modules(s.course.id).await.unwrap();
        assert_eq!(listed.first().unwrap().position, Some(Position::first()));
    }

    #[tokio::test]
    async fn malformed_reorder_payload_is_rejected() {
        let s = setup().await;
        let err = s
            .service
            .reorder_contents(&json!(["not", "an", "object"]), s.author)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidReorder(_)));
    }

    #[tokio::test]
    async fn update_module_keeps_position() {
        let s = setup().await;
        s.service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        let b = s
            .service
            .create_module(s.course.id, module("B"), s.author)
            .await
            .unwrap();

        let updated = s
            .service
            .update_module(b.id, "Basics".into(), "intro".into(), s.author)
            .await
            .unwrap();
        assert_eq!(updated.position, b.position);

        let listed = s.service.list_modules(s.course.id).await.unwrap();
        assert_eq!(titles(&listed), ["A", "Basics"]);
    }

    #[tokio::test]
    async fn contents_are_sequenced_per_module() {
        let s = setup().await;
        let first = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        let second = s
            .service
            .create_module(s.course.id, module("B"), s.author)
            .await
            .unwrap();

        for title in ["one", "two"] {
            s.service
                .create_content(first.id, ContentKind::Text, text(title, "body"), s.author)
                .await
                .unwrap();
        }
        let other = s
            .service
            .create_content(second.id, ContentKind::Text, text("solo", "body"), s.author)
            .await
            .unwrap();
        assert_eq!(other.position, Some(Position::first()));

        let listed = s.service.list_contents(first.id).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["one", "two"]);
        assert!(listed[0].html.contains("<p>body</p>"));
    }

    #[tokio::test]
    async fn only_item_owner_edits_content() {
        let s = setup().await;
        let m = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        let c = s
            .service
            .create_content(m.id, ContentKind::Text, text("one", "body"), s.author)
            .await
            .unwrap();

        let err = s
            .service
            .update_content_item(c.id, text("hijack", "x"), UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        let edited = s
            .service
            .update_content_item(c.id, text("renamed", "new body"), s.author)
            .await
            .unwrap();
        assert_eq!(edited.item.title(), "renamed");
        assert_eq!(edited.position, c.position);
    }

    #[tokio::test]
    async fn content_edits_require_course_ownership() {
        let s = setup().await;
        let m = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        let c = s
            .service
            .create_content(m.id, ContentKind::Text, text("one", "body"), s.author)
            .await
            .unwrap();

        // Same item owner, but the course changed hands.
        let mut course = s.course.clone();
        course.owner = UserId::new();
        s.service.unit_of_work().courses.update_course(&course).await.unwrap();

        let err = s
            .service
            .update_content_item(c.id, text("renamed", "x"), s.author)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn module_contents_are_limited_to_author_and_students() {
        let s = setup().await;
        let student = UserId::new();
        let m = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        s.service
            .create_content(m.id, ContentKind::Text, text("answers", "exam key"), s.author)
            .await
            .unwrap();

        let err = s
            .service
            .list_contents_for(m.id, student)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        assert_eq!(s.service.list_contents_for(m.id, s.author).await.unwrap().len(), 1);
        s.service.enroll(s.course.id, student).await.unwrap();
        assert_eq!(s.service.list_contents_for(m.id, student).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_course_cascades() {
        let s = setup().await;
        let m = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        let c = s
            .service
            .create_content(m.id, ContentKind::Text, text("one", "body"), s.author)
            .await
            .unwrap();

        s.service.delete_course(s.course.id, s.author).await.unwrap();

        let uow = s.service.unit_of_work();
        assert!(uow.modules.find(m.id).await.unwrap().is_none());
        assert!(uow.contents.find(c.id).await.unwrap().is_none());
        assert!(matches!(
            s.service.get_course(s.course.id).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn course_contents_require_enrollment() {
        let s = setup().await;
        let student = UserId::new();
        let m = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        s.service
            .create_content(m.id, ContentKind::Text, text("one", "body"), s.author)
            .await
            .unwrap();

        let err = s
            .service
            .course_contents(s.course.id, student)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        s.service.enroll(s.course.id, student).await.unwrap();
        let view = s.service.course_contents(s.course.id, student).await.unwrap();
        assert_eq!(view.modules.len(), 1);
        assert_eq!(view.modules[0].contents.len(), 1);

        let enrolled = s.service.list_enrolled_courses(student).await.unwrap();
        assert_eq!(enrolled.len(), 1);
    }

    #[tokio::test]
    async fn student_module_defaults_to_first() {
        let s = setup().await;
        let student = UserId::new();
        let a = s
            .service
            .create_module(s.course.id, module("A"), s.author)
            .await
            .unwrap();
        let b = s
            .service
            .create_module(s.course.id, module("B"), s.author)
            .await
            .unwrap();
        s.service.enroll(s.course.id, student).await.unwrap();

        let view = s
            .service
            .student_module(s.course.id, None, student)
            .await
            .unwrap();
        assert_eq!(view.current.unwrap().module.id, a.id);

        let view = s
            .service
            .student_module(s.course.id, Some(b.id), student)
            .await
            .unwrap();
        assert_eq!(view.current.unwrap().module.id, b.id);
    }

    #[tokio::test]
    async fn subjects_count_their_courses() {
        let s = setup().await;
        let subjects = s.service.list_subjects().await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].total_courses, 1);
    }
}
