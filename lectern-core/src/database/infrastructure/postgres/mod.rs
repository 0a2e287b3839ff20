//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

pub use repositories::contents::PostgresContentRepository;
pub use repositories::courses::PostgresCourseRepository;
pub use repositories::modules::PostgresModuleRepository;
