//! Process-local adapters used by tests and by servers running without a
//! database.

mod courses;
mod positions;

pub use courses::InMemoryCourseRepository;
pub use positions::InMemoryPositionStore;
