//! # Lectern Core
//!
//! Course authoring logic for the Lectern platform: ordered modules inside
//! courses, ordered polymorphic contents inside modules, and the services
//! and repositories that move them in and out of storage.
//!
//! ## Overview
//!
//! - **Position sequencing**: [`ordering::PositionSequencer`] assigns
//!   `max + 1` positions per scope, serializes assignment, and applies
//!   ownership-scoped drag-and-drop reorder batches
//! - **Repositories**: trait ports with in-memory and PostgreSQL adapters
//! - **Application service**: [`application::CourseService`] for subjects,
//!   courses, modules, contents and enrollment
//! - **Routes**: versioned HTTP route constants shared with clients
//!
//! ## Feature Flags
//!
//! - `database` (default): PostgreSQL adapters and embedded migrations
//! - `pg-tests`: integration tests against a live PostgreSQL
//!
//! ## Example
//!
//! ```no_run
//! use lectern_core::application::{AppUnitOfWork, CourseService};
//! use lectern_core::ordering::SequencerSettings;
//! use lectern_model::{CourseDraft, ModuleDraft, UserId};
//!
//! async fn outline() -> lectern_core::Result<()> {
//!     let service = CourseService::new(AppUnitOfWork::in_memory(), SequencerSettings::default());
//!     let author = UserId::new();
//!     let subject = service.create_subject("Systems".into(), "systems".into()).await?;
//!     let course = service
//!         .create_course(
//!             author,
//!             CourseDraft {
//!                 subject_id: subject.id,
//!                 title: "Operating systems".into(),
//!                 slug: "os".into(),
//!                 overview: String::new(),
//!             },
//!         )
//!         .await?;
//!     let module = ModuleDraft { title: "Processes".into(), ..Default::default() };
//!     service.create_module(course.id, module, author).await?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// HTTP route constants
pub mod api;

/// Application services composed from the repository ports
pub mod application;

/// Repository ports and their adapters
pub mod database;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Error types and error handling utilities
pub mod error;

/// Position sequencing for ordered entities
pub mod ordering;

pub use error::{CoreError, Result};
pub use lectern_model as model;
