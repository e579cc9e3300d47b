//! Position store: where every card sits, how it stacks, and how big it is.
//!
//! DESIGN
//! ======
//! The store is the single owner of card geometry. Every write is clamped so
//! a card's footprint stays inside the viewport; callers never see an
//! unclamped position. Footprints come from the renderer through
//! [`FootprintSource`] when a live measurement exists, otherwise from the
//! last cached measurement, otherwise from the default card size.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use rand::Rng;

use crate::consts::{DEFAULT_CARD_HEIGHT, DEFAULT_CARD_WIDTH, GRID_GAP_PX};
use crate::doc::TodoId;
use crate::geom::{Point, Rect, Size, clamp_to_viewport};

/// Live size measurement supplied by the rendering collaborator.
pub trait FootprintSource {
    /// Current on-screen size of the card, or `None` when it isn't measurable
    /// right now (not mounted, hidden, headless).
    fn footprint(&self, id: TodoId) -> Option<Size>;
}

/// Footprint source for hosts that never measure anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMeasurement;

impl FootprintSource for NoMeasurement {
    fn footprint(&self, _id: TodoId) -> Option<Size> {
        None
    }
}

/// A card's position and stacking order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    /// Higher values are drawn above lower ones.
    pub z: i64,
}

pub struct PositionStore {
    placements: HashMap<TodoId, Placement>,
    footprints: HashMap<TodoId, Size>,
    viewport: Size,
    default_footprint: Size,
}

impl PositionStore {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            placements: HashMap::new(),
            footprints: HashMap::new(),
            viewport,
            default_footprint: Size::new(DEFAULT_CARD_WIDTH, DEFAULT_CARD_HEIGHT),
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resize the viewport and re-clamp every card into it.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let ids: Vec<TodoId> = self.placements.keys().copied().collect();
        for id in ids {
            self.reclamp(id);
        }
    }

    // --- Positions ---

    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<Point> {
        self.placements.get(&id).map(|p| p.position)
    }

    #[must_use]
    pub fn placement(&self, id: TodoId) -> Option<Placement> {
        self.placements.get(&id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.placements.contains_key(&id)
    }

    /// Store a clamped position and return what was stored. An unknown id is
    /// inserted on top of the stack.
    pub fn set(&mut self, id: TodoId, position: Point) -> Point {
        let clamped = self.clamp(id, position);
        let next_z = self.max_z() + 1;
        self.placements
            .entry(id)
            .and_modify(|p| p.position = clamped)
            .or_insert(Placement { position: clamped, z: next_z });
        clamped
    }

    /// Insert a card with an explicit stacking order.
    pub fn insert(&mut self, id: TodoId, position: Point, z: i64) {
        let position = self.clamp(id, position);
        self.placements.insert(id, Placement { position, z });
    }

    /// Remove a card's placement together with its cached footprint.
    pub fn remove(&mut self, id: TodoId) -> Option<Placement> {
        self.footprints.remove(&id);
        self.placements.remove(&id)
    }

    pub fn clear(&mut self) {
        self.placements.clear();
        self.footprints.clear();
    }

    /// Clamp `position` to the viewport minus this card's footprint.
    #[must_use]
    pub fn clamp(&self, id: TodoId, position: Point) -> Point {
        clamp_to_viewport(position, self.footprint(id), self.viewport)
    }

    // --- Stacking ---

    #[must_use]
    pub fn z(&self, id: TodoId) -> Option<i64> {
        self.placements.get(&id).map(|p| p.z)
    }

    /// Highest stacking order in use, or 0 when empty.
    #[must_use]
    pub fn max_z(&self) -> i64 {
        self.placements.values().map(|p| p.z).max().unwrap_or(0)
    }

    /// Raise a card to `max + 1`.
    pub fn bring_to_front(&mut self, id: TodoId) -> Option<i64> {
        let z = self.max_z() + 1;
        let p = self.placements.get_mut(&id)?;
        p.z = z;
        Some(z)
    }

    /// Ids ordered bottom to top, ties broken by id.
    #[must_use]
    pub fn ids_by_z(&self) -> Vec<TodoId> {
        let mut ids: Vec<(i64, TodoId)> = self.placements.iter().map(|(id, p)| (p.z, *id)).collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Every position, ordered by id.
    #[must_use]
    pub fn positions(&self) -> Vec<(TodoId, Point)> {
        let mut out: Vec<(TodoId, Point)> = self.placements.iter().map(|(id, p)| (*id, p.position)).collect();
        out.sort_unstable_by_key(|(id, _)| *id);
        out
    }

    // --- Footprints ---

    /// Cached footprint, or the default card size.
    #[must_use]
    pub fn footprint(&self, id: TodoId) -> Size {
        self.footprints.get(&id).copied().unwrap_or(self.default_footprint)
    }

    #[must_use]
    pub fn has_cached_footprint(&self, id: TodoId) -> bool {
        self.footprints.contains_key(&id)
    }

    /// Cache a measured footprint and re-clamp the card against it.
    pub fn report_footprint(&mut self, id: TodoId, size: Size) {
        if !self.placements.contains_key(&id) {
            return;
        }
        self.footprints.insert(id, size);
        self.reclamp(id);
    }

    /// Ask `source` for a live measurement, caching it when present. A
    /// changed size re-clamps the card.
    pub fn refresh_footprint(&mut self, id: TodoId, source: &dyn FootprintSource) -> Size {
        match source.footprint(id) {
            Some(size) if self.placements.contains_key(&id) => {
                if self.footprints.insert(id, size) != Some(size) {
                    self.reclamp(id);
                }
                size
            }
            _ => self.footprint(id),
        }
    }

    #[must_use]
    pub fn rect(&self, id: TodoId) -> Option<Rect> {
        let position = self.get(id)?;
        Some(Rect::new(position, self.footprint(id)))
    }

    #[must_use]
    pub fn center(&self, id: TodoId) -> Option<Point> {
        self.rect(id).map(|r| r.center())
    }

    // --- Initial placement ---

    /// Top-left corner of the `index`-th slot in a row-major grid of default
    /// sized cards.
    #[must_use]
    pub fn grid_position(&self, index: usize) -> Point {
        let cell_w = self.default_footprint.width + GRID_GAP_PX;
        let cell_h = self.default_footprint.height + GRID_GAP_PX;
        let usable = (self.viewport.width - GRID_GAP_PX).max(0.0);
        let columns = usize_from_floor(usable / cell_w).max(1);
        let col = index % columns;
        let row = index / columns;
        Point::new(GRID_GAP_PX + as_f64(col) * cell_w, GRID_GAP_PX + as_f64(row) * cell_h)
    }

    /// A uniformly random position that keeps a default card on screen.
    #[must_use]
    pub fn random_position(&self) -> Point {
        let max_x = (self.viewport.width - self.default_footprint.width).max(0.0);
        let max_y = (self.viewport.height - self.default_footprint.height).max(0.0);
        let mut rng = rand::rng();
        Point::new(rng.random_range(0.0..=max_x), rng.random_range(0.0..=max_y))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    fn reclamp(&mut self, id: TodoId) {
        let Some(current) = self.get(id) else {
            return;
        };
        let clamped = self.clamp(id, current);
        if let Some(p) = self.placements.get_mut(&id) {
            p.position = clamped;
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(n: usize) -> f64 {
    n as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn usize_from_floor(v: f64) -> usize {
    if v.is_finite() && v > 0.0 { v.floor() as usize } else { 0 }
}
