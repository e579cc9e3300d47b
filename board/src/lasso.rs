//! Free-form lasso selection.
//!
//! A lasso accumulates pointer positions into an implicitly closed polygon.
//! A card is enclosed when any of its eight boundary samples falls inside the
//! polygon, so partially wrapped cards are picked up too.

#[cfg(test)]
#[path = "lasso_test.rs"]
mod lasso_test;

use std::collections::HashSet;

use crate::doc::TodoId;
use crate::geom::{Point, point_in_polygon};
use crate::store::PositionStore;

#[derive(Debug, Clone, PartialEq)]
pub struct Lasso {
    path: Vec<Point>,
    /// Selection that existed when the gesture began.
    base: HashSet<TodoId>,
}

impl Lasso {
    #[must_use]
    pub fn begin(start: Point, base: HashSet<TodoId>) -> Self {
        Self { path: vec![start], base }
    }

    pub fn extend(&mut self, pt: Point) {
        self.path.push(pt);
    }

    #[must_use]
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    #[must_use]
    pub fn base(&self) -> &HashSet<TodoId> {
        &self.base
    }

    /// Cards with at least one boundary sample inside the polygon.
    #[must_use]
    pub fn enclosed(&self, store: &PositionStore) -> HashSet<TodoId> {
        if self.path.len() < 3 {
            return HashSet::new();
        }
        store
            .ids_by_z()
            .into_iter()
            .filter(|id| {
                store
                    .rect(*id)
                    .is_some_and(|r| r.sample_points().iter().any(|p| point_in_polygon(*p, &self.path)))
            })
            .collect()
    }

    /// The selection this lasso implies; `additive` unions it with the base.
    #[must_use]
    pub fn selection(&self, store: &PositionStore, additive: bool) -> HashSet<TodoId> {
        let mut selected = self.enclosed(store);
        if additive {
            selected.extend(self.base.iter().copied());
        }
        selected
    }
}
