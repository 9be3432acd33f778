//! Single-element moves over the team order.

use crate::models::TeamId;

/// Remove the element at `from` and reinsert it at `to`. Every other element
/// keeps its relative order.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

/// The id order that results from dropping `source` onto `target`.
///
/// The source takes the target's index. Returns `None` when the drop is a
/// no-op: same element, or either id is not in `order`.
pub fn plan_move(order: &[TeamId], source: &TeamId, target: &TeamId) -> Option<Vec<TeamId>> {
    if source == target {
        return None;
    }
    let from = order.iter().position(|id| id == source)?;
    let to = order.iter().position(|id| id == target)?;

    let mut moved = order.to_vec();
    move_item(&mut moved, from, to);
    Some(moved)
}
