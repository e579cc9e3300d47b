//! Hit testing: which card, and which part of it, lies under a point.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::DELETE_CONTROL_PX;
use crate::doc::TodoId;
use crate::geom::{Point, Rect, Size};
use crate::store::PositionStore;

/// Which part of a card was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    /// The delete control in the top-right corner.
    DeleteControl,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: TodoId,
    pub part: HitPart,
}

/// Topmost card under `pt`, if any.
#[must_use]
pub fn hit_test(pt: Point, store: &PositionStore) -> Option<Hit> {
    let id = topmost_at(pt, store)?;
    let rect = store.rect(id)?;
    let part = if delete_control_rect(&rect).contains(pt) { HitPart::DeleteControl } else { HitPart::Body };
    Some(Hit { id, part })
}

/// Topmost card whose rectangle contains `pt`.
#[must_use]
pub fn topmost_at(pt: Point, store: &PositionStore) -> Option<TodoId> {
    store
        .ids_by_z()
        .into_iter()
        .rev()
        .find(|id| store.rect(*id).is_some_and(|r| r.contains(pt)))
}

/// Hit region of a card's delete control.
#[must_use]
pub fn delete_control_rect(card: &Rect) -> Rect {
    let side = DELETE_CONTROL_PX.min(card.size.width).min(card.size.height);
    Rect::new(Point::new(card.right() - side, card.origin.y), Size::new(side, side))
}
