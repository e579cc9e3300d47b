//! Input model: modifier keys, mouse buttons, keys, and the gesture state
//! machine.
//!
//! This module defines the types consumed by the engine. `Modifiers` capture
//! the held keys at the time of an event. `InputState` is the active gesture
//! being tracked between pointer-down and pointer-up (or, for push mode,
//! between modifier down and up), carrying the context needed to compute
//! incremental moves and emit final syncs on release. `InputEvent` is the
//! serializable form of every handler call, used to replay recorded input.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::doc::TodoId;
use crate::geom::Point;
use crate::lasso::Lasso;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held. Makes lasso and click selection additive.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held. Push mode.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Platform shortcut modifier (Ctrl or Command).
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g.
/// `"Delete"`, `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Whether this is `name`, ignoring ASCII case for single characters.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        if self.0.chars().count() == 1 { self.0.eq_ignore_ascii_case(name) } else { self.0 == name }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Lasso / shift-click selection.
    pub selection: HashSet<TodoId>,
    /// Card under the pointer, target of keyboard shortcuts.
    pub hovered: Option<TodoId>,
    /// Last known pointer position.
    pub pointer: Option<Point>,
    /// A host modal (quick-create prompt) is open.
    pub modal_open: bool,
    /// Debug overlay requested.
    pub debug_overlay: bool,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// One card, or a selected group, follows the pointer.
    Dragging {
        /// Card under the pointer at press time.
        id: TodoId,
        /// Pointer position minus card position at press time.
        offset: Point,
        /// Position of the primary card at press time.
        origin: Point,
        /// Press-time positions of every other selected card, for group drag.
        group: HashMap<TodoId, Point>,
        /// Pointer position at the previous event.
        last_pointer: Point,
        /// Smoothed pointer velocity in pixels per move event. Momentum reads
        /// it as pixels per frame, so hosts send at most one move per frame
        /// (browsers coalesce pointer moves to animation frames).
        velocity: Point,
        /// Whether the pointer moved since the press.
        moved: bool,
    },
    /// A lasso polyline is being drawn.
    Lassoing { lasso: Lasso },
    /// Pointer movement repels cards while Alt is held.
    Pushing {
        /// Whether any card moved during this push.
        moved: bool,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    #[must_use]
    pub fn is_lassoing(&self) -> bool {
        matches!(self, Self::Lassoing { .. })
    }

    #[must_use]
    pub fn is_pushing(&self) -> bool {
        matches!(self, Self::Pushing { .. })
    }
}

/// One host input event, in the shape the engine handlers take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Advance the simulation by `dt_ms`.
    Tick { dt_ms: f64 },
}
