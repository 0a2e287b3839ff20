//! API-facing facade shared by the server and HTTP clients.

pub mod routes;
pub mod types;

pub use types::{ApiResponse, CreateSubjectRequest, OrderSaved, UpdateModuleRequest};
