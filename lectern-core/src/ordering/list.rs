use std::cmp::Ordering;

use super::Orderable;

/// Entities of one scope in display order.
///
/// Finite and restartable: iterate it as many times as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedList<E> {
    items: Vec<E>,
}

impl<E> Default for OrderedList<E> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<E: Orderable> OrderedList<E> {
    /// Sort by position ascending, then creation time, then id. Entities
    /// without a position sort after all positioned ones.
    pub fn sorted(mut items: Vec<E>) -> Self {
        items.sort_by(compare::<E>);
        Self { items }
    }
}

impl<E> OrderedList<E> {
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&E> {
        self.items.first()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<E> {
        self.items
    }
}

impl<E> IntoIterator for OrderedList<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a OrderedList<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn compare<E: Orderable>(a: &E, b: &E) -> Ordering {
    let by_position = match (a.position(), b.position()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_position
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use lectern_model::{CourseId, Module, ModuleDraft, Position};

    fn module(title: &str, position: Option<u32>) -> Module {
        Module::new(
            CourseId::new(),
            ModuleDraft {
                title: title.into(),
                position: position.map(|p| Position::new(p).unwrap()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn titles(list: &OrderedList<Module>) -> Vec<&str> {
        list.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn ties_fall_back_to_creation_order() {
        let now = Utc::now();
        let mut late = module("late", Some(1));
        late.created_at = now;
        let mut early = module("early", Some(1));
        early.created_at = now - Duration::seconds(5);
        let first = module("first", Some(0));

        let list = OrderedList::sorted(vec![late, early, first]);
        assert_eq!(titles(&list), ["first", "early", "late"]);
    }

    #[test]
    fn unpositioned_entities_sort_last() {
        let list = OrderedList::sorted(vec![module("pending", None), module("placed", Some(7))]);
        assert_eq!(titles(&list), ["placed", "pending"]);
    }

    #[test]
    fn list_is_restartable() {
        let list = OrderedList::sorted(vec![module("a", Some(0)), module("b", Some(1))]);
        let once: Vec<_> = list.iter().collect();
        let twice: Vec<_> = list.iter().collect();
        assert_eq!(once, twice);
    }
}
