//! Sibling ordering for entity trees.
//!
//! Siblings are compared by `type`, then `name`, then `id`, then element
//! name. At each level an absent value sorts after any present one, so the
//! better described entities come first. The element name is always present
//! and breaks the remaining ties.

use crate::model::Entity;
use std::cmp::Ordering;

/// Total order over entities used to sort the children of every tree node.
pub fn compare_entities(a: &Entity, b: &Entity) -> Ordering {
    absent_last(a.entity_type(), b.entity_type())
        .then_with(|| absent_last(a.name(), b.name()))
        .then_with(|| absent_last(a.id(), b.id()))
        .then_with(|| a.element_name().cmp(b.element_name()))
}

/// Stable sort of `entities` by [`compare_entities`].
pub fn sort_entities(entities: &mut [Entity]) {
    entities.sort_by(compare_entities);
}

fn absent_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
