use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::error::ModelError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
        pub struct $name(pub Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|_| {
                    ModelError::InvalidId {
                        kind: $kind,
                        value: s.to_string(),
                    }
                })
            }
        }
    };
}

define_id!(
    /// Identifier of a subject (course category).
    SubjectId,
    "subject"
);
define_id!(
    /// Identifier of a course.
    CourseId,
    "course"
);
define_id!(
    /// Identifier of a module; also the ordering scope of its contents.
    ModuleId,
    "module"
);
define_id!(
    /// Identifier of a content slot inside a module.
    ContentId,
    "content"
);
define_id!(
    /// Identifier of an instructor or student.
    UserId,
    "user"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_display() {
        let id = CourseId::new();
        let parsed: CourseId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_garbage_with_kind() {
        let err = "not-a-uuid".parse::<ModuleId>().unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidId {
                kind: "module",
                value: "not-a-uuid".into()
            }
        );
    }
}
