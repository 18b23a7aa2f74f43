use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{BandMember, Song};

/// Entities that can be manually reordered and otherwise fall back to a name.
pub trait Orderable {
    fn id(&self) -> &str;
    fn order(&self) -> Option<i64>;
    fn sort_name(&self) -> &str;
}

impl Orderable for Song {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn sort_name(&self) -> &str {
        &self.name
    }
}

impl Orderable for BandMember {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn sort_name(&self) -> &str {
        &self.first_name
    }
}

/// Entities with an explicit order first (ascending), then the rest by name.
/// Case is ignored first so "ana" and "Ana" sit together.
pub fn compare_for_display<T: Orderable>(a: &T, b: &T) -> Ordering {
    match (a.order(), b.order()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .sort_name()
            .to_lowercase()
            .cmp(&b.sort_name().to_lowercase())
            .then_with(|| a.sort_name().cmp(b.sort_name())),
    }
}

/// Stable in-place display sort.
pub fn sort_for_display<T: Orderable>(items: &mut [T]) {
    items.sort_by(compare_for_display);
}

/// Orders to assign after a manual reorder. `current` must already be in
/// display order. Ids in `ids` take positions `0..k` (unknown or repeated ids
/// are skipped); every other entity follows in its current relative order.
pub fn reorder_plan<T: Orderable>(current: &[T], ids: &[String]) -> Vec<(String, i64)> {
    let known: HashSet<&str> = current.iter().map(Orderable::id).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut plan = Vec::with_capacity(current.len());

    for id in ids {
        if known.contains(id.as_str()) && seen.insert(id.as_str()) {
            plan.push(id.clone());
        }
    }
    for item in current {
        if !seen.contains(item.id()) {
            plan.push(item.id().to_string());
        }
    }

    plan.into_iter()
        .enumerate()
        .map(|(position, id)| (id, position as i64))
        .collect()
}
