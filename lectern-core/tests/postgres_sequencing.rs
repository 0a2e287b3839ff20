#![cfg(feature = "pg-tests")]

use std::collections::HashSet;

use anyhow::Result;
use lectern_core::application::{AppUnitOfWork, CourseService};
use lectern_core::database::{InsertGuard, PositionStore};
use lectern_core::ordering::SequencerSettings;
use lectern_model::{CourseDraft, Module, ModuleDraft, Position, UserId};
use serde_json::json;
use sqlx::PgPool;

async fn course_fixture(service: &CourseService, author: UserId) -> Result<lectern_model::Course> {
    let subject = service
        .create_subject("Databases".into(), "databases".into())
        .await?;
    Ok(service
        .create_course(
            author,
            CourseDraft {
                subject_id: subject.id,
                title: "PostgreSQL".into(),
                slug: "postgresql".into(),
                overview: String::new(),
            },
        )
        .await?)
}

fn draft(title: &str) -> ModuleDraft {
    ModuleDraft {
        title: title.into(),
        ..Default::default()
    }
}

#[sqlx::test(migrator = "lectern_core::MIGRATOR")]
async fn modules_are_sequenced_and_reordered(pool: PgPool) -> Result<()> {
    let service = CourseService::new(AppUnitOfWork::postgres(pool), SequencerSettings::default());
    let author = UserId::new();
    let course = course_fixture(&service, author).await?;

    let a = service.create_module(course.id, draft("A"), author).await?;
    let b = service.create_module(course.id, draft("B"), author).await?;
    assert_eq!(a.position, Some(Position::first()));
    assert_eq!(b.position, Some(Position::new(1)?));

    let payload = json!({ (a.id.to_string()): 1, (b.id.to_string()): 0 });
    service.reorder_modules(&payload, author).await?;

    let titles: Vec<String> = service
        .list_modules(course.id)
        .await?
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, ["B", "A"]);
    Ok(())
}

#[sqlx::test(migrator = "lectern_core::MIGRATOR")]
async fn stale_guard_is_rejected_inside_the_transaction(pool: PgPool) -> Result<()> {
    let uow = AppUnitOfWork::postgres(pool.clone());
    let service = CourseService::new(uow.clone(), SequencerSettings::default());
    let author = UserId::new();
    let course = course_fixture(&service, author).await?;

    service.create_module(course.id, draft("first"), author).await?;

    let mut late = Module::new(course.id, draft("late"))?;
    late.position = Some(Position::first());
    let err = uow
        .modules
        .insert(late, InsertGuard::Sequenced { observed_max: None })
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    Ok(())
}

#[sqlx::test(migrator = "lectern_core::MIGRATOR")]
async fn concurrent_services_share_the_advisory_lock(pool: PgPool) -> Result<()> {
    let author = UserId::new();
    let seed = CourseService::new(AppUnitOfWork::postgres(pool.clone()), SequencerSettings::default());
    let course = course_fixture(&seed, author).await?;

    // Separate services model separate processes: no shared in-process locks.
    let mut handles = Vec::new();
    for i in 0..8 {
        let service =
            CourseService::new(AppUnitOfWork::postgres(pool.clone()), SequencerSettings::default());
        handles.push(tokio::spawn(async move {
            service
                .create_module(course.id, draft(&format!("m{i}")), author)
                .await
        }));
    }

    let mut positions = HashSet::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await? {
            Ok(module) => {
                positions.insert(module.position.map(Position::get));
            }
            Err(err) if err.is_conflict() => conflicts += 1,
            Err(err) => return Err(err.into()),
        }
    }
    let stored = seed.list_modules(course.id).await?;
    assert_eq!(stored.len() + conflicts, 8);
    assert_eq!(positions.len(), stored.len());
    Ok(())
}

#[sqlx::test(migrator = "lectern_core::MIGRATOR")]
async fn deleting_a_course_cascades_in_postgres(pool: PgPool) -> Result<()> {
    let uow = AppUnitOfWork::postgres(pool);
    let service = CourseService::new(uow.clone(), SequencerSettings::default());
    let author = UserId::new();
    let course = course_fixture(&service, author).await?;
    let module = service.create_module(course.id, draft("A"), author).await?;

    service.delete_course(course.id, author).await?;
    assert!(uow.modules.find(module.id).await?.is_none());
    Ok(())
}
