use axum::{
    Router,
    routing::{get, post, put},
};
use lectern_core::api::routes::v1 as paths;

use crate::{
    AppState,
    handlers::{contents, courses, enrollment, health, modules, subjects},
};

/// Strip the version root so the paths can be nested under it.
fn local(path: &'static str) -> &'static str {
    path.strip_prefix(paths::ROOT).unwrap_or(path)
}

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(local(paths::HEALTH), get(health::health_handler))
        .merge(create_catalog_routes())
        .merge(create_authoring_routes())
        .merge(create_student_routes())
}

/// Subjects and the public course catalog
fn create_catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            local(paths::subjects::COLLECTION),
            get(subjects::list_subjects).post(subjects::create_subject),
        )
        .route(
            local(paths::courses::COLLECTION),
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            local(paths::courses::ITEM),
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
}

/// Instructor endpoints: modules, contents and their order
fn create_authoring_routes() -> Router<AppState> {
    Router::new()
        .route(local(paths::courses::MINE), get(courses::list_my_courses))
        .route(
            local(paths::courses::MODULES),
            get(courses::list_course_modules).post(courses::create_module),
        )
        .route(local(paths::modules::ORDER), post(modules::reorder_modules))
        .route(
            local(paths::modules::ITEM),
            put(modules::update_module).delete(modules::delete_module),
        )
        .route(
            local(paths::modules::CONTENTS),
            get(contents::list_module_contents),
        )
        .route(
            local(paths::modules::CREATE_CONTENT),
            post(contents::create_content),
        )
        .route(local(paths::content::ORDER), post(contents::reorder_contents))
        .route(
            local(paths::content::ITEM),
            put(contents::update_content).delete(contents::delete_content),
        )
}

/// Enrollment and the student course views
fn create_student_routes() -> Router<AppState> {
    Router::new()
        .route(
            local(paths::courses::ENROLLED),
            get(enrollment::list_enrolled_courses),
        )
        .route(local(paths::courses::ENROLL), post(enrollment::enroll))
        .route(
            local(paths::courses::CONTENTS),
            get(enrollment::course_contents),
        )
        .route(local(paths::courses::STUDY), get(enrollment::study_course))
        .route(
            local(paths::courses::STUDY_MODULE),
            get(enrollment::study_module),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths_drop_the_version_root() {
        assert_eq!(local(paths::modules::ORDER), "/modules/order");
        assert_eq!(local(paths::HEALTH), "/health");
    }
}
