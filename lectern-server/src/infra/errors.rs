use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lectern_core::CoreError;
use lectern_model::ModelError;
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => Self::not_found(msg),
            CoreError::Forbidden(msg) => Self::forbidden(msg),
            CoreError::InvalidInput(_) | CoreError::InvalidReorder(_) => {
                Self::bad_request(err.to_string())
            }
            CoreError::PositionConflict { .. } => {
                tracing::warn!(error = %err, "position assignment lost a race");
                Self::internal(err.to_string())
            }
            CoreError::Database(ref source) => {
                tracing::error!(error = ?source, "database operation failed");
                Self::internal("Database operation failed")
            }
            CoreError::Serialization(_) | CoreError::Internal(_) => {
                tracing::error!(error = %err, "request failed");
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}
