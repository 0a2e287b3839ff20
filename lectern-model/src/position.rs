use std::fmt;

use crate::error::{ModelError, Result};

/// Sort key of an entity among its siblings in one scope.
///
/// Positions are non-negative and bounded by `i32::MAX` so they store
/// losslessly in a PostgreSQL `INTEGER` column. They are not required to be
/// unique or contiguous; only their relative order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "i64", into = "u32")
)]
pub struct Position(u32);

impl Position {
    pub const MAX: Position = Position(i32::MAX as u32);

    /// Position handed to the first entity of an empty scope.
    pub const fn first() -> Self {
        Position(0)
    }

    pub fn new(value: u32) -> Result<Self> {
        Self::try_from(i64::from(value))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Position immediately after `self`.
    pub fn next(self) -> Result<Self> {
        if self >= Self::MAX {
            return Err(ModelError::PositionOverflow);
        }
        Ok(Position(self.0 + 1))
    }

    /// Value following the current scope maximum, or the first position when
    /// the scope is empty.
    pub fn after(max: Option<Position>) -> Result<Self> {
        match max {
            Some(max) => max.next(),
            None => Ok(Self::first()),
        }
    }

    pub fn to_i32(self) -> i32 {
        // Invariant: self.0 <= i32::MAX
        self.0 as i32
    }
}

impl TryFrom<i64> for Position {
    type Error = ModelError;

    fn try_from(value: i64) -> Result<Self> {
        if (0..=i64::from(i32::MAX)).contains(&value) {
            Ok(Position(value as u32))
        } else {
            Err(ModelError::InvalidPosition(value))
        }
    }
}

impl TryFrom<i32> for Position {
    type Error = ModelError;

    fn try_from(value: i32) -> Result<Self> {
        Self::try_from(i64::from(value))
    }
}

impl From<Position> for u32 {
    fn from(value: Position) -> Self {
        value.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
