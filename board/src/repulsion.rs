//! Repulsion simulator.
//!
//! DESIGN
//! ======
//! A discrete-time pairwise relaxation. Each tick, every card is pushed away
//! from every other card whose center lies within `radius`, with a quadratic
//! falloff that is zero at the radius and maximal at zero distance. Forces are
//! computed from a snapshot of centers taken before any card moves, so the
//! pass is symmetric and independent of iteration order. Only a fraction
//! (`smoothing`) of the summed force is applied per frame; there is no
//! velocity state. O(n²), which is fine for the tens of cards on screen.

#[cfg(test)]
#[path = "repulsion_test.rs"]
mod repulsion_test;

use std::collections::HashSet;

use crate::consts::{
    ACTIVE_REPULSION_FORCE, ACTIVE_REPULSION_RADIUS, IDLE_REPULSION_FORCE, IDLE_REPULSION_RADIUS, PUSH_FORCE,
    PUSH_RADIUS, REPULSION_EPSILON, REPULSION_SMOOTHING,
};
use crate::doc::TodoId;
use crate::geom::Point;
use crate::store::PositionStore;

/// Shape of a repulsion field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepulsionParams {
    /// Center distance at which the force reaches zero.
    pub radius: f64,
    /// Force magnitude at zero distance.
    pub force: f64,
    /// Fraction of the summed force applied per frame.
    pub smoothing: f64,
}

impl RepulsionParams {
    /// Background separation while nothing is being manipulated.
    pub const IDLE: Self = Self { radius: IDLE_REPULSION_RADIUS, force: IDLE_REPULSION_FORCE, smoothing: REPULSION_SMOOTHING };

    /// Separation while a drag or push is in progress.
    pub const ACTIVE: Self =
        Self { radius: ACTIVE_REPULSION_RADIUS, force: ACTIVE_REPULSION_FORCE, smoothing: REPULSION_SMOOTHING };

    /// Pointer-centered push; applied in full on each pointer move.
    pub const PUSH: Self = Self { radius: PUSH_RADIUS, force: PUSH_FORCE, smoothing: 1.0 };

    /// Force magnitude at `distance`, or zero outside `(EPSILON, radius)`.
    #[must_use]
    pub fn magnitude(&self, distance: f64) -> f64 {
        if distance <= REPULSION_EPSILON || distance >= self.radius {
            return 0.0;
        }
        let falloff = 1.0 - distance / self.radius;
        self.force * falloff * falloff
    }

    /// Force on something at `delta` from the source, along `delta`.
    fn force_along(&self, delta: Point) -> Point {
        let distance = delta.length();
        let magnitude = self.magnitude(distance);
        if magnitude <= 0.0 {
            return Point::default();
        }
        delta * (magnitude / distance)
    }
}

/// Run one relaxation pass over every card. `pinned` cards still repel the
/// others but are not displaced themselves. Returns the largest displacement
/// applied, in pixels.
pub fn relax(store: &mut PositionStore, params: RepulsionParams, pinned: &HashSet<TodoId>, frames: f64) -> f64 {
    if store.len() < 2 {
        return 0.0;
    }
    let centers: Vec<(TodoId, Point)> =
        store.ids_by_z().into_iter().filter_map(|id| store.center(id).map(|c| (id, c))).collect();

    let mut steps = Vec::with_capacity(centers.len());
    for (id, center) in &centers {
        if pinned.contains(id) {
            continue;
        }
        let total = centers
            .iter()
            .filter(|(other, _)| other != id)
            .fold(Point::default(), |acc, (_, other_center)| acc + params.force_along(*center - *other_center));
        if total != Point::default() {
            steps.push((*id, total * (params.smoothing * frames)));
        }
    }

    apply_steps(store, &steps)
}

/// Push every card away from `origin` (the pointer). Returns the largest
/// displacement applied.
pub fn push_from(store: &mut PositionStore, origin: Point, params: RepulsionParams) -> f64 {
    let steps: Vec<(TodoId, Point)> = store
        .ids_by_z()
        .into_iter()
        .filter_map(|id| {
            let center = store.center(id)?;
            let force = params.force_along(center - origin);
            (force != Point::default()).then(|| (id, force * params.smoothing))
        })
        .collect();

    apply_steps(store, &steps)
}

fn apply_steps(store: &mut PositionStore, steps: &[(TodoId, Point)]) -> f64 {
    let mut max_displacement: f64 = 0.0;
    for (id, step) in steps {
        let Some(before) = store.get(*id) else {
            continue;
        };
        let after = store.set(*id, before + *step);
        max_displacement = max_displacement.max(after.distance(before));
    }
    max_displacement
}
