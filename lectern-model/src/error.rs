use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidId { kind: &'static str, value: String },
    InvalidPosition(i64),
    PositionOverflow,
    UnsupportedContentKind(String),
    InvalidUrl(String),
    Validation(String),
}

impl ModelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ModelError::Validation(msg.into())
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidId { kind, value } => {
                write!(f, "invalid {kind} id: {value:?}")
            }
            ModelError::InvalidPosition(value) => {
                write!(f, "invalid position: {value} (expected 0..={})", i32::MAX)
            }
            ModelError::PositionOverflow => {
                write!(f, "position sequence exhausted for scope")
            }
            ModelError::UnsupportedContentKind(kind) => {
                write!(f, "unsupported content kind: {kind}")
            }
            ModelError::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
            ModelError::Validation(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
