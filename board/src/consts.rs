//! Shared numeric constants for the board crate.

// ── Frames ──────────────────────────────────────────────────────

/// Nominal frame length in milliseconds (60 fps). Tick deltas are expressed
/// as multiples of this.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Upper bound on frames simulated by a single tick, so a stalled host loop
/// does not fling cards across the board.
pub const MAX_FRAMES_PER_TICK: f64 = 4.0;

// ── Cards ───────────────────────────────────────────────────────

/// Footprint used when neither a live measurement nor a cached one exists.
pub const DEFAULT_CARD_WIDTH: f64 = 200.0;
pub const DEFAULT_CARD_HEIGHT: f64 = 100.0;

/// Square hit region for the delete control in a card's top-right corner.
pub const DELETE_CONTROL_PX: f64 = 24.0;

/// Gap between grid slots when placing unpositioned todos.
pub const GRID_GAP_PX: f64 = 24.0;

// ── Repulsion ───────────────────────────────────────────────────

/// Separations at or below this are left alone (no defined direction).
pub const REPULSION_EPSILON: f64 = 0.01;

pub const IDLE_REPULSION_RADIUS: f64 = 160.0;
pub const IDLE_REPULSION_FORCE: f64 = 40.0;

/// Wider, stronger field while a drag or push is in progress.
pub const ACTIVE_REPULSION_RADIUS: f64 = 220.0;
pub const ACTIVE_REPULSION_FORCE: f64 = 60.0;

/// Fraction of the summed force applied per frame.
pub const REPULSION_SMOOTHING: f64 = 0.1;

pub const PUSH_RADIUS: f64 = 150.0;
pub const PUSH_FORCE: f64 = 30.0;

// ── Momentum ────────────────────────────────────────────────────

/// Per-frame velocity retention after release.
pub const MOMENTUM_FRICTION: f64 = 0.92;

/// Momentum ends once speed (px/frame) drops below this.
pub const MOMENTUM_MIN_SPEED: f64 = 0.5;

/// Release speed (px/frame, one move event per frame) required to start
/// momentum at all.
pub const MOMENTUM_RELEASE_SPEED: f64 = 2.0;

/// Weight of the newest pointer delta in the smoothed release velocity.
pub const VELOCITY_SMOOTHING: f64 = 0.3;

// ── History ─────────────────────────────────────────────────────

/// Maximum entries kept on each of the undo and redo stacks.
pub const HISTORY_CAPACITY: usize = 50;
