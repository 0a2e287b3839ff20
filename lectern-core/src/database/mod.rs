pub mod infrastructure;
pub mod ports;

pub use ports::courses::CourseRepository;
pub use ports::positions::{InsertGuard, PositionStore};
