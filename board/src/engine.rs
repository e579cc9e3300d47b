//! Engine: owns the board state and turns input and ticks into actions.

use std::collections::{HashMap, HashSet};

use crate::consts::{FRAME_MS, MAX_FRAMES_PER_TICK, MOMENTUM_RELEASE_SPEED, VELOCITY_SMOOTHING};
use crate::doc::{DocStore, PartialTodo, Todo, TodoId};
use crate::geom::{Point, Size};
use crate::hit::{Hit, HitPart, hit_test, topmost_at};
use crate::input::{Button, InputEvent, InputState, Key, Modifiers, UiState};
use crate::lasso::Lasso;
use crate::momentum::Momentum;
use crate::repulsion::{self, RepulsionParams};
use crate::store::{FootprintSource, NoMeasurement, PositionStore};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers and ticks for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Persist these positions. Emitted on drag end, push release, momentum
    /// settle, and explicit full sync; never per frame.
    SyncPositions(Vec<(TodoId, Point)>),
    /// Flip completion of a todo.
    ToggleRequested(TodoId),
    /// Delete a todo.
    DeleteRequested(TodoId),
    /// Open the quick-create prompt.
    CreatePromptRequested,
    /// Close the open prompt without creating anything.
    PromptClosed,
    UndoRequested,
    RedoRequested,
    /// The debug overlay was switched on or off.
    DebugOverlayToggled(bool),
    /// Something visible changed.
    RenderNeeded,
}

/// The spatial interaction engine.
///
/// Owns todo content, card geometry, the gesture state machine, selection,
/// and momentum. Every handler is synchronous and returns the [`Action`]s the
/// host has to carry out; the engine itself never performs I/O and never
/// schedules anything. The host drives animation by calling [`Engine::tick`].
pub struct Engine {
    pub doc: DocStore,
    pub store: PositionStore,
    pub ui: UiState,
    pub input: InputState,
    pub momentum: Momentum,
    footprints: Box<dyn FootprintSource>,
    last_motion: f64,
}

impl Engine {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            doc: DocStore::new(),
            store: PositionStore::new(viewport),
            ui: UiState::default(),
            input: InputState::default(),
            momentum: Momentum::new(),
            footprints: Box::new(NoMeasurement),
            last_motion: 0.0,
        }
    }

    /// Use `source` for live card measurements.
    pub fn set_footprint_source(&mut self, source: Box<dyn FootprintSource>) {
        self.footprints = source;
    }

    // --- Data inputs ---

    /// Replace everything with a backend snapshot. Todos without a position
    /// are laid out on grid slots; their ids are returned.
    pub fn load_snapshot(&mut self, todos: Vec<(Todo, Option<Point>)>) -> Vec<TodoId> {
        self.store.clear();
        self.momentum.clear();
        self.input = InputState::Idle;
        self.ui.selection.clear();
        self.ui.hovered = None;

        let mut placed = Vec::new();
        let mut contents = Vec::with_capacity(todos.len());
        for (z, (todo, position)) in (1_i64..).zip(todos) {
            let position = position.unwrap_or_else(|| {
                placed.push(todo.id);
                self.store.grid_position(placed.len() - 1)
            });
            self.store.insert(todo.id, position, z);
            contents.push(todo);
        }
        self.doc.load_snapshot(contents);
        placed
    }

    /// Add a todo on top of the stack. Without a position it lands somewhere
    /// random on screen. Returns the stored (clamped) position.
    pub fn insert_todo(&mut self, todo: Todo, position: Option<Point>) -> Point {
        let id = todo.id;
        let position = position.unwrap_or_else(|| self.store.random_position());
        self.doc.insert(todo);
        let z = self.store.max_z() + 1;
        self.store.insert(id, position, z);
        self.store.get(id).unwrap_or(position)
    }

    /// Apply a content update. Returns false for unknown ids.
    pub fn update_todo(&mut self, id: TodoId, partial: &PartialTodo) -> bool {
        self.doc.apply_partial(id, partial)
    }

    /// Remove a todo and every trace of it: content, placement, footprint,
    /// selection, hover, momentum, and any gesture involving it.
    pub fn remove_todo(&mut self, id: TodoId) -> Option<(Todo, Option<Point>)> {
        let todo = self.doc.remove(id);
        let placement = self.store.remove(id);
        self.momentum.cancel(id);
        self.ui.selection.remove(&id);
        self.refresh_hover();
        let dragging_it = matches!(&self.input, InputState::Dragging { id: dragged, .. } if *dragged == id);
        if dragging_it {
            self.input = InputState::Idle;
        } else if let InputState::Dragging { group, .. } = &mut self.input {
            group.remove(&id);
        }
        todo.map(|t| (t, placement.map(|p| p.position)))
    }

    /// Content and position of a todo, as history snapshots need them.
    #[must_use]
    pub fn snapshot(&self, id: TodoId) -> Option<(Todo, Option<Point>)> {
        let todo = self.doc.get(id)?.clone();
        Some((todo, self.store.get(id)))
    }

    // --- Viewport ---

    /// Update viewport dimensions, re-clamping every card.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.store.set_viewport(viewport);
        self.refresh_hover();
    }

    /// Cache a measured card size pushed by the renderer.
    pub fn report_footprint(&mut self, id: TodoId, size: Size) {
        self.store.report_footprint(id, size);
        self.refresh_hover();
    }

    /// The host closed its prompt.
    pub fn close_prompt(&mut self) {
        self.ui.modal_open = false;
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.ui.pointer = Some(pt);
        if !self.input.is_idle() {
            return Vec::new();
        }

        match (button, hit_test(pt, &self.store)) {
            (Button::Primary, Some(Hit { id, part: HitPart::DeleteControl })) => vec![Action::DeleteRequested(id)],
            (Button::Primary, Some(Hit { id, part: HitPart::Body })) => {
                if modifiers.shift {
                    if !self.ui.selection.remove(&id) {
                        self.ui.selection.insert(id);
                    }
                    return vec![Action::RenderNeeded];
                }
                if !self.ui.selection.contains(&id) {
                    self.ui.selection.clear();
                }
                self.begin_drag(id, pt)
            }
            (Button::Secondary, None) => {
                if !modifiers.shift {
                    self.ui.selection.clear();
                }
                let base = self.ui.selection.clone();
                self.input = InputState::Lassoing { lasso: Lasso::begin(pt, base) };
                vec![Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.ui.pointer = Some(pt);
        let mut actions = Vec::new();

        if modifiers.alt && !self.input.is_pushing() {
            actions.extend(self.enter_push());
        } else if !modifiers.alt && self.input.is_pushing() {
            actions.extend(self.exit_push());
        }

        let mut render = false;
        match &mut self.input {
            InputState::Idle => {}
            InputState::Dragging { id, offset, origin, group, last_pointer, velocity, moved } => {
                let target = pt - *offset;
                let delta = target - *origin;
                *velocity = *velocity * (1.0 - VELOCITY_SMOOTHING) + (pt - *last_pointer) * VELOCITY_SMOOTHING;
                *last_pointer = pt;
                *moved = true;
                self.store.set(*id, target);
                for (member, member_origin) in group.iter() {
                    self.store.set(*member, *member_origin + delta);
                }
                render = true;
            }
            InputState::Lassoing { lasso } => {
                lasso.extend(pt);
                self.ui.selection = lasso.selection(&self.store, modifiers.shift);
                render = true;
            }
            InputState::Pushing { moved } => {
                if repulsion::push_from(&mut self.store, pt, RepulsionParams::PUSH) > 0.0 {
                    *moved = true;
                    render = true;
                }
            }
        }

        if self.refresh_hover() || render {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_pointer_up(&mut self, pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        self.ui.pointer = Some(pt);
        match std::mem::take(&mut self.input) {
            InputState::Dragging { id, group, velocity, moved, .. } if button == Button::Primary => {
                let mut actions = Vec::new();
                if moved {
                    let mut ids: Vec<TodoId> = group.keys().copied().collect();
                    ids.sort_unstable();
                    ids.insert(0, id);
                    actions.push(Action::SyncPositions(self.positions_of(&ids)));
                }
                if velocity.length() > MOMENTUM_RELEASE_SPEED {
                    self.momentum.start(id, velocity);
                }
                actions.push(Action::RenderNeeded);
                actions
            }
            InputState::Lassoing { .. } if button == Button::Secondary => vec![Action::RenderNeeded],
            other => {
                self.input = other;
                Vec::new()
            }
        }
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        if key.is("Alt") {
            return if self.input.is_pushing() { Vec::new() } else { self.enter_push() };
        }
        if key.is("Escape") {
            if self.ui.modal_open {
                self.ui.modal_open = false;
                return vec![Action::PromptClosed];
            }
            if self.ui.selection.is_empty() {
                return Vec::new();
            }
            self.ui.selection.clear();
            return vec![Action::RenderNeeded];
        }
        if modifiers.command() {
            if key.is("z") {
                return vec![if modifiers.shift { Action::RedoRequested } else { Action::UndoRequested }];
            }
            return Vec::new();
        }
        if self.ui.modal_open {
            return Vec::new();
        }

        if key.is("n") {
            self.ui.modal_open = true;
            return vec![Action::CreatePromptRequested];
        }
        if key.is("g") {
            self.ui.debug_overlay = !self.ui.debug_overlay;
            return vec![Action::DebugOverlayToggled(self.ui.debug_overlay), Action::RenderNeeded];
        }
        let Some(hovered) = self.ui.hovered else {
            return Vec::new();
        };
        if key.is("t") {
            return vec![Action::ToggleRequested(hovered)];
        }
        if key.is("d") || key.is("Delete") || key.is("Backspace") {
            return vec![Action::DeleteRequested(hovered)];
        }
        Vec::new()
    }

    pub fn on_key_up(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is("Alt") && self.input.is_pushing() {
            return self.exit_push();
        }
        Vec::new()
    }

    /// Feed one recorded input event through the matching handler.
    pub fn dispatch(&mut self, event: InputEvent) -> Vec<Action> {
        match event {
            InputEvent::PointerDown { x, y, button, modifiers } => self.on_pointer_down(Point::new(x, y), button, modifiers),
            InputEvent::PointerMove { x, y, modifiers } => self.on_pointer_move(Point::new(x, y), modifiers),
            InputEvent::PointerUp { x, y, button, modifiers } => self.on_pointer_up(Point::new(x, y), button, modifiers),
            InputEvent::KeyDown { key, modifiers } => self.on_key_down(key, modifiers),
            InputEvent::KeyUp { key, modifiers } => self.on_key_up(key, modifiers),
            InputEvent::Tick { dt_ms } => self.tick(dt_ms),
        }
    }

    // --- Simulation ---

    /// Advance repulsion and momentum by `dt_ms` of wall time.
    pub fn tick(&mut self, dt_ms: f64) -> Vec<Action> {
        let frames = (dt_ms / FRAME_MS).clamp(0.0, MAX_FRAMES_PER_TICK);
        if frames <= 0.0 || !frames.is_finite() {
            self.last_motion = 0.0;
            return Vec::new();
        }

        for id in self.store.ids_by_z() {
            self.store.refresh_footprint(id, self.footprints.as_ref());
        }

        let (params, pinned) = match &self.input {
            InputState::Dragging { id, group, .. } => {
                let mut pinned: HashSet<TodoId> = group.keys().copied().collect();
                pinned.insert(*id);
                (RepulsionParams::ACTIVE, pinned)
            }
            InputState::Pushing { .. } => (RepulsionParams::ACTIVE, HashSet::new()),
            _ => (RepulsionParams::IDLE, HashSet::new()),
        };
        let relaxed = repulsion::relax(&mut self.store, params, &pinned, frames);
        let glide = self.momentum.step(&mut self.store, frames);
        self.last_motion = relaxed.max(glide.displacement);
        let hover_changed = self.refresh_hover();

        let mut actions = Vec::new();
        if !glide.settled.is_empty() {
            actions.push(Action::SyncPositions(self.positions_of(&glide.settled)));
        }
        if self.last_motion > 0.0 || hover_changed {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// A sync of every card's position, for periodic full flushes.
    #[must_use]
    pub fn full_sync(&self) -> Action {
        Action::SyncPositions(self.store.positions())
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &HashSet<TodoId> {
        &self.ui.selection
    }

    #[must_use]
    pub fn hovered(&self) -> Option<TodoId> {
        self.ui.hovered
    }

    #[must_use]
    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn position(&self, id: TodoId) -> Option<Point> {
        self.store.get(id)
    }

    /// Points of the lasso being drawn, for the renderer.
    #[must_use]
    pub fn lasso_path(&self) -> Option<&[Point]> {
        match &self.input {
            InputState::Lassoing { lasso } => Some(lasso.path()),
            _ => None,
        }
    }

    /// Largest displacement applied by the last tick.
    #[must_use]
    pub fn last_motion(&self) -> f64 {
        self.last_motion
    }

    /// No gesture, no momentum, and the last tick moved less than `tolerance`.
    #[must_use]
    pub fn is_at_rest(&self, tolerance: f64) -> bool {
        self.input.is_idle() && self.momentum.is_empty() && self.last_motion < tolerance
    }

    // --- Internals ---

    /// Re-resolve the hovered card from the last pointer position. Returns
    /// whether it changed.
    fn refresh_hover(&mut self) -> bool {
        let hovered = self.ui.pointer.and_then(|p| topmost_at(p, &self.store));
        let changed = hovered != self.ui.hovered;
        self.ui.hovered = hovered;
        changed
    }

    fn begin_drag(&mut self, id: TodoId, pt: Point) -> Vec<Action> {
        if !self.store.contains(id) {
            return Vec::new();
        }
        self.momentum.cancel(id);
        self.store.refresh_footprint(id, self.footprints.as_ref());
        let Some(origin) = self.store.get(id) else {
            return Vec::new();
        };

        let mut group = HashMap::new();
        if self.ui.selection.contains(&id) {
            for member in &self.ui.selection {
                if *member == id {
                    continue;
                }
                if let Some(position) = self.store.get(*member) {
                    self.momentum.cancel(*member);
                    group.insert(*member, position);
                }
            }
        }
        self.store.bring_to_front(id);
        self.input = InputState::Dragging {
            id,
            offset: pt - origin,
            origin,
            group,
            last_pointer: pt,
            velocity: Point::default(),
            moved: false,
        };
        vec![Action::RenderNeeded]
    }

    fn enter_push(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Dragging { id, group, moved, .. } => {
                if moved {
                    let mut ids: Vec<TodoId> = group.keys().copied().collect();
                    ids.sort_unstable();
                    ids.insert(0, id);
                    actions.push(Action::SyncPositions(self.positions_of(&ids)));
                }
                self.input = InputState::Pushing { moved: false };
            }
            InputState::Idle | InputState::Pushing { .. } => self.input = InputState::Pushing { moved: false },
            lassoing @ InputState::Lassoing { .. } => self.input = lassoing,
        }
        actions
    }

    fn exit_push(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Pushing { moved } => {
                if moved {
                    vec![self.full_sync()]
                } else {
                    Vec::new()
                }
            }
            other => {
                self.input = other;
                Vec::new()
            }
        }
    }

    fn positions_of(&self, ids: &[TodoId]) -> Vec<(TodoId, Point)> {
        ids.iter()
            .filter_map(|id| self.store.get(*id).map(|p| (*id, p)))
            .collect()
    }
}
