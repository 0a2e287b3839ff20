pub mod contents;
pub mod courses;
pub mod enrollment;
pub mod health;
pub mod modules;
pub mod subjects;

use axum::extract::rejection::JsonRejection;

use crate::infra::errors::AppError;

/// Bodies that are not readable JSON fail an order request with 400.
pub(crate) fn malformed_order(rejection: JsonRejection) -> AppError {
    AppError::bad_request(format!("Invalid reorder payload: {}", rejection.body_text()))
}
