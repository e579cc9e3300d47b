#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::{DEFAULT_CARD_HEIGHT, DEFAULT_CARD_WIDTH};
use crate::geom::Size;

const VIEW_W: f64 = 2000.0;
const VIEW_H: f64 = 1500.0;

fn store_with(cards: &[(TodoId, f64, f64)]) -> PositionStore {
    let mut store = PositionStore::new(Size::new(VIEW_W, VIEW_H));
    for (id, x, y) in cards {
        store.set(*id, Point::new(*x, *y));
    }
    store
}

fn center_distance(store: &PositionStore, a: TodoId, b: TodoId) -> f64 {
    store.center(a).unwrap().distance(store.center(b).unwrap())
}

fn no_pins() -> HashSet<TodoId> {
    HashSet::new()
}

// =============================================================
// magnitude
// =============================================================

#[test]
fn magnitude_is_zero_at_and_beyond_radius() {
    let p = RepulsionParams::IDLE;
    assert_eq!(p.magnitude(p.radius), 0.0);
    assert_eq!(p.magnitude(p.radius + 1.0), 0.0);
}

#[test]
fn magnitude_is_zero_below_epsilon() {
    assert_eq!(RepulsionParams::IDLE.magnitude(0.0), 0.0);
}

#[test]
fn magnitude_has_quadratic_falloff() {
    let p = RepulsionParams { radius: 100.0, force: 10.0, smoothing: 1.0 };
    assert!((p.magnitude(50.0) - 2.5).abs() < 1e-9);
    assert!((p.magnitude(90.0) - 0.1).abs() < 1e-9);
    assert!(p.magnitude(10.0) > p.magnitude(20.0));
}

// =============================================================
// relax
// =============================================================

#[test]
fn close_pair_moves_apart() {
    let mut store = store_with(&[(1, 500.0, 500.0), (2, 560.0, 500.0)]);
    let before = center_distance(&store, 1, 2);
    let moved = relax(&mut store, RepulsionParams::IDLE, &no_pins(), 1.0);
    assert!(moved > 0.0);
    assert!(center_distance(&store, 1, 2) > before);
}

#[test]
fn close_pair_moves_symmetrically() {
    let mut store = store_with(&[(1, 500.0, 500.0), (2, 560.0, 500.0)]);
    relax(&mut store, RepulsionParams::IDLE, &no_pins(), 1.0);
    let a = store.get(1).unwrap();
    let b = store.get(2).unwrap();
    assert!(((500.0 - a.x) - (b.x - 560.0)).abs() < 1e-9);
    assert_eq!(a.y, 500.0);
    assert_eq!(b.y, 500.0);
}

#[test]
fn distant_pair_does_not_move() {
    let mut store = store_with(&[(1, 100.0, 100.0), (2, 1000.0, 1000.0)]);
    let moved = relax(&mut store, RepulsionParams::IDLE, &no_pins(), 1.0);
    assert_eq!(moved, 0.0);
    assert_eq!(store.get(1), Some(Point::new(100.0, 100.0)));
    assert_eq!(store.get(2), Some(Point::new(1000.0, 1000.0)));
}

#[test]
fn single_card_is_untouched() {
    let mut store = store_with(&[(1, 100.0, 100.0)]);
    assert_eq!(relax(&mut store, RepulsionParams::IDLE, &no_pins(), 1.0), 0.0);
}

#[test]
fn coincident_cards_are_left_alone() {
    let mut store = store_with(&[(1, 300.0, 300.0), (2, 300.0, 300.0)]);
    assert_eq!(relax(&mut store, RepulsionParams::IDLE, &no_pins(), 1.0), 0.0);
}

#[test]
fn pinned_card_does_not_move_but_repels() {
    let mut store = store_with(&[(1, 500.0, 500.0), (2, 560.0, 500.0)]);
    let pins = HashSet::from([1]);
    relax(&mut store, RepulsionParams::IDLE, &pins, 1.0);
    assert_eq!(store.get(1), Some(Point::new(500.0, 500.0)));
    assert!(store.get(2).unwrap().x > 560.0);
}

#[test]
fn active_field_reaches_further_than_idle() {
    // Centers 190 apart: outside the idle radius, inside the active one.
    let mut idle = store_with(&[(1, 500.0, 500.0), (2, 690.0, 500.0)]);
    let mut active = store_with(&[(1, 500.0, 500.0), (2, 690.0, 500.0)]);
    assert_eq!(relax(&mut idle, RepulsionParams::IDLE, &no_pins(), 1.0), 0.0);
    assert!(relax(&mut active, RepulsionParams::ACTIVE, &no_pins(), 1.0) > 0.0);
}

#[test]
fn more_frames_move_further() {
    let mut one = store_with(&[(1, 500.0, 500.0), (2, 560.0, 500.0)]);
    let mut two = store_with(&[(1, 500.0, 500.0), (2, 560.0, 500.0)]);
    let d1 = relax(&mut one, RepulsionParams::IDLE, &no_pins(), 1.0);
    let d2 = relax(&mut two, RepulsionParams::IDLE, &no_pins(), 2.0);
    assert!(d2 > d1);
}

#[test]
fn relaxation_keeps_cards_in_bounds() {
    let mut store = store_with(&[(1, 0.0, 0.0), (2, 20.0, 10.0), (3, 5.0, 30.0)]);
    for _ in 0..200 {
        relax(&mut store, RepulsionParams::ACTIVE, &no_pins(), 4.0);
    }
    for (_, p) in store.positions() {
        assert!(p.x >= 0.0 && p.x <= VIEW_W - DEFAULT_CARD_WIDTH);
        assert!(p.y >= 0.0 && p.y <= VIEW_H - DEFAULT_CARD_HEIGHT);
    }
}

// =============================================================
// push_from
// =============================================================

#[test]
fn push_moves_nearby_card_away_from_pointer() {
    let mut store = store_with(&[(1, 500.0, 500.0)]);
    // Card center is (600, 550); push from just left of it.
    let moved = push_from(&mut store, Point::new(560.0, 550.0), RepulsionParams::PUSH);
    assert!(moved > 0.0);
    let p = store.get(1).unwrap();
    assert!(p.x > 500.0);
    assert_eq!(p.y, 500.0);
}

#[test]
fn push_ignores_distant_cards() {
    let mut store = store_with(&[(1, 500.0, 500.0)]);
    let moved = push_from(&mut store, Point::new(0.0, 0.0), RepulsionParams::PUSH);
    assert_eq!(moved, 0.0);
    assert_eq!(store.get(1), Some(Point::new(500.0, 500.0)));
}
