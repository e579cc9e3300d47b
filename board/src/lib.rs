//! Spatial interaction engine for the floating todo board.
//!
//! Todos are cards scattered over a bounded viewport. This crate owns
//! everything that happens on that surface: card geometry and stacking,
//! dragging (alone or as a selected group), lasso selection, the Alt "push"
//! gesture, pairwise repulsion, release momentum, and the bounded undo/redo
//! history. It performs no I/O. Hosts feed it input events and ticks and
//! carry out the [`engine::Action`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::Engine`] and the actions it emits |
//! | [`doc`] | Todo records and the content store |
//! | [`store`] | Positions, z-order, footprints, viewport clamping |
//! | [`geom`] | Points, sizes, rectangles, polygon containment |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing cards and their delete control |
//! | [`lasso`] | Freehand lasso path and enclosed-card selection |
//! | [`repulsion`] | Pairwise and pointer-origin repulsion forces |
//! | [`momentum`] | Per-card release velocity with friction |
//! | [`history`] | Bounded undo/redo stacks of reversible operations |
//! | [`consts`] | Shared tuning constants |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod history;
pub mod hit;
pub mod input;
pub mod lasso;
pub mod momentum;
pub mod repulsion;
pub mod store;
