#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum_test::TestServer;
use lectern_config::{
    ConfigMetadata,
    loader::compose,
    models::sources::{EnvConfig, FileConfig},
};
use lectern_core::application::AppUnitOfWork;
use lectern_model::{Course, CourseDraft, Module, ModuleDraft, UserId};
use lectern_server::{AppState, create_app, infra::actor::ACTOR_HEADER};

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

/// An in-memory server with default configuration.
pub fn build_test_app() -> Result<TestApp> {
    let config = compose(
        FileConfig::default(),
        EnvConfig::default(),
        ConfigMetadata::default(),
    )?;
    let state = AppState::new(AppUnitOfWork::in_memory(), Arc::new(config));
    let server =
        TestServer::new(create_app(state.clone())).map_err(|err| anyhow!(err.to_string()))?;
    Ok(TestApp { server, state })
}

pub fn actor_header() -> &'static str {
    ACTOR_HEADER
}

pub fn as_actor(user: UserId) -> String {
    user.to_string()
}

/// Seed a course owned by `author` directly through the service.
pub async fn seed_course(state: &AppState, author: UserId, slug: &str) -> Result<Course> {
    let subject = state
        .service()
        .create_subject(format!("Subject {slug}"), format!("subject-{slug}"))
        .await?;
    let course = state
        .service()
        .create_course(
            author,
            CourseDraft {
                subject_id: subject.id,
                title: format!("Course {slug}"),
                slug: slug.to_string(),
                overview: String::new(),
            },
        )
        .await?;
    Ok(course)
}

pub async fn seed_modules(
    state: &AppState,
    course: &Course,
    author: UserId,
    titles: &[&str],
) -> Result<Vec<Module>> {
    let mut modules = Vec::with_capacity(titles.len());
    for title in titles {
        let draft = ModuleDraft {
            title: (*title).to_string(),
            ..Default::default()
        };
        modules.push(
            state
                .service()
                .create_module(course.id, draft, author)
                .await?,
        );
    }
    Ok(modules)
}

pub async fn module_titles(state: &AppState, course: &Course) -> Result<Vec<String>> {
    Ok(state
        .service()
        .list_modules(course.id)
        .await?
        .into_iter()
        .map(|module| module.title)
        .collect())
}
