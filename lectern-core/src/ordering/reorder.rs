use std::{collections::BTreeMap, fmt, str::FromStr};

use lectern_model::Position;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// How a reorder batch treats ids that are missing or not owned by the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReorderPolicy {
    /// Skip such ids silently and apply the rest.
    #[default]
    BestEffort,
    /// Reject the whole batch before writing anything.
    FailFast,
}

impl ReorderPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ReorderPolicy::BestEffort => "best-effort",
            ReorderPolicy::FailFast => "fail-fast",
        }
    }
}

impl fmt::Display for ReorderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReorderPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "best-effort" => Ok(ReorderPolicy::BestEffort),
            "fail-fast" => Ok(ReorderPolicy::FailFast),
            other => Err(CoreError::InvalidInput(format!(
                "unknown reorder policy {other:?} (expected best-effort or fail-fast)"
            ))),
        }
    }
}

/// Requested `id -> position` assignments, applied in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderBatch<I: Ord> {
    entries: BTreeMap<I, Position>,
}

impl<I: Ord> Default for ReorderBatch<I> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<I: Ord + Copy> ReorderBatch<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: I, position: Position) -> Self {
        self.entries.insert(id, position);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, Position)> + '_ {
        self.entries.iter().map(|(id, position)| (*id, *position))
    }
}

impl<I> ReorderBatch<I>
where
    I: Ord + Copy + FromStr,
    I::Err: fmt::Display,
{
    /// Parse the drag-and-drop wire format: a JSON object mapping entity id
    /// strings to integer positions. Any malformed entry rejects the batch.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            CoreError::InvalidReorder(
                "expected a JSON object mapping ids to positions".to_string(),
            )
        })?;

        let mut entries = BTreeMap::new();
        for (raw_id, raw_position) in object {
            let id = raw_id.parse::<I>().map_err(|e| {
                CoreError::InvalidReorder(format!("invalid id {raw_id:?}: {e}"))
            })?;
            let position = raw_position
                .as_i64()
                .ok_or_else(|| {
                    CoreError::InvalidReorder(format!(
                        "position for {raw_id} must be an integer, got {raw_position}"
                    ))
                })
                .and_then(|n| {
                    Position::try_from(n).map_err(|e| {
                        CoreError::InvalidReorder(format!("position for {raw_id}: {e}"))
                    })
                })?;
            entries.insert(id, position);
        }

        Ok(Self { entries })
    }
}

impl<I: Ord> FromIterator<(I, Position)> for ReorderBatch<I> {
    fn from_iter<T: IntoIterator<Item = (I, Position)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Why an entry of a batch was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotFound,
    Unauthorized,
}

/// Per-entry result of a reorder batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderOutcome<I> {
    pub applied: Vec<I>,
    pub skipped: Vec<(I, SkipReason)>,
}

impl<I> Default for ReorderOutcome<I> {
    fn default() -> Self {
        Self {
            applied: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<I> ReorderOutcome<I> {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_model::ModuleId;
    use serde_json::json;

    #[test]
    fn parses_object_of_integer_positions() {
        let a = ModuleId::new();
        let b = ModuleId::new();
        let body = json!({ a.to_string(): 1, b.to_string(): 0 });
        let batch = ReorderBatch::<ModuleId>::from_json(&body).unwrap();
        assert_eq!(batch.len(), 2);
        let pairs: Vec<_> = batch.iter().collect();
        assert!(pairs.contains(&(a, Position::new(1).unwrap())));
        assert!(pairs.contains(&(b, Position::first())));
    }

    #[test]
    fn empty_object_is_a_valid_noop() {
        let batch = ReorderBatch::<ModuleId>::from_json(&json!({})).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn rejects_non_object_bodies() {
        for body in [json!([1, 2]), json!("x"), json!(null), json!(3)] {
            let err = ReorderBatch::<ModuleId>::from_json(&body).unwrap_err();
            assert!(matches!(err, CoreError::InvalidReorder(_)), "{body}");
        }
    }

    #[test]
    fn one_bad_entry_rejects_everything() {
        let good = ModuleId::new().to_string();
        let bad_values = [json!("2"), json!(1.5), json!(-1), json!(i64::from(i32::MAX) + 1), json!(null)];
        for bad in bad_values {
            let body = json!({ good.clone(): 0, ModuleId::new().to_string(): bad });
            assert!(
                matches!(
                    ReorderBatch::<ModuleId>::from_json(&body),
                    Err(CoreError::InvalidReorder(_))
                ),
                "accepted {body}"
            );
        }
    }

    #[test]
    fn rejects_unparsable_ids() {
        let body = json!({ "42": 0 });
        assert!(matches!(
            ReorderBatch::<ModuleId>::from_json(&body),
            Err(CoreError::InvalidReorder(_))
        ));
    }

    #[test]
    fn policy_parses_loose_spellings() {
        assert_eq!("FAIL_FAST".parse::<ReorderPolicy>().unwrap(), ReorderPolicy::FailFast);
        assert_eq!("best-effort".parse::<ReorderPolicy>().unwrap(), ReorderPolicy::BestEffort);
        assert!("strict".parse::<ReorderPolicy>().is_err());
    }
}
