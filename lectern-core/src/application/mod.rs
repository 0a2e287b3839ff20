pub mod courses;
pub mod ownership;
pub mod unit_of_work;
pub mod views;

pub use courses::CourseService;
pub use unit_of_work::AppUnitOfWork;
