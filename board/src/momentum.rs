//! Post-release momentum.
//!
//! A card released while moving fast keeps gliding along its release
//! velocity, losing a fixed fraction per frame to friction. The entry is
//! dropped as soon as the decayed speed falls below [`MOMENTUM_MIN_SPEED`];
//! from then on the card stays where it is.

#[cfg(test)]
#[path = "momentum_test.rs"]
mod momentum_test;

use std::collections::HashMap;

use crate::consts::{MOMENTUM_FRICTION, MOMENTUM_MIN_SPEED};
use crate::doc::TodoId;
use crate::geom::Point;
use crate::store::PositionStore;

/// Result of advancing momentum by one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MomentumStep {
    /// Largest displacement applied this tick, in pixels.
    pub displacement: f64,
    /// Cards whose momentum ended this tick.
    pub settled: Vec<TodoId>,
}

/// Per-card release velocities, in pixels per frame.
#[derive(Debug, Clone, Default)]
pub struct Momentum {
    velocities: HashMap<TodoId, Point>,
}

impl Momentum {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or replace) momentum for a card.
    pub fn start(&mut self, id: TodoId, velocity: Point) {
        self.velocities.insert(id, velocity);
    }

    /// Stop a card's momentum. Returns whether any was in flight.
    pub fn cancel(&mut self, id: TodoId) -> bool {
        self.velocities.remove(&id).is_some()
    }

    #[must_use]
    pub fn velocity(&self, id: TodoId) -> Option<Point> {
        self.velocities.get(&id).copied()
    }

    #[must_use]
    pub fn is_moving(&self, id: TodoId) -> bool {
        self.velocities.contains_key(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    pub fn clear(&mut self) {
        self.velocities.clear();
    }

    /// Decay every velocity by friction and move its card. A velocity axis
    /// that runs into a viewport wall is zeroed.
    pub fn step(&mut self, store: &mut PositionStore, frames: f64) -> MomentumStep {
        let mut out = MomentumStep::default();
        let mut ids: Vec<TodoId> = self.velocities.keys().copied().collect();
        ids.sort_unstable();

        let retention = MOMENTUM_FRICTION.powf(frames);
        for id in ids {
            let Some(before) = store.get(id) else {
                self.velocities.remove(&id);
                continue;
            };
            let Some(velocity) = self.velocities.get(&id).copied() else {
                continue;
            };

            let mut velocity = velocity * retention;
            if velocity.length() < MOMENTUM_MIN_SPEED {
                self.velocities.remove(&id);
                out.settled.push(id);
                continue;
            }

            let target = before + velocity * frames;
            let after = store.set(id, target);
            if (after.x - target.x).abs() > f64::EPSILON {
                velocity.x = 0.0;
            }
            if (after.y - target.y).abs() > f64::EPSILON {
                velocity.y = 0.0;
            }
            self.velocities.insert(id, velocity);
            out.displacement = out.displacement.max(after.distance(before));
        }
        out
    }
}
