use lectern_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed reorder payload; the whole batch is rejected.
    #[error("Invalid reorder payload: {0}")]
    InvalidReorder(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A sequenced insert observed a stale scope maximum.
    #[error("Position conflict in scope {scope}")]
    PositionConflict { scope: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(what: impl Into<String>) -> Self {
        Self::Forbidden(what.into())
    }

    pub fn conflict(scope: impl std::fmt::Display) -> Self {
        Self::PositionConflict {
            scope: scope.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::PositionConflict { .. })
    }
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::PositionOverflow => Self::Internal(err.to_string()),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
