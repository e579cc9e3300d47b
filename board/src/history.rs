//! Undo/redo log for create, delete, and toggle actions.
//!
//! DESIGN
//! ======
//! Two bounded stacks. Recording a new action clears the redo stack (linear
//! history). Undo and redo are split into `peek_*` and `commit_*` so the host
//! can run the inverse against the backend first and only move the entry
//! once that succeeded; a failed remote call leaves both stacks untouched.
//! Position changes are never recorded.
//!
//! Re-creating a todo (undoing a delete, redoing a create) yields a new
//! backend id. [`History::remap_id`] rewrites every entry that referred to
//! the old id so older entries keep targeting the live todo.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::HISTORY_CAPACITY;
use crate::doc::{Todo, TodoId};
use crate::geom::Point;

/// What a history entry undoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Create,
    Delete,
    /// Completion was flipped; `prior` is the value before the flip.
    Toggle { prior: bool },
}

/// The affected todo as it was when the action happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub todo: Todo,
    /// Last known position, used when the todo has to be re-created.
    pub position: Option<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub snapshot: Snapshot,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(kind: HistoryKind, todo: Todo, position: Option<Point>) -> Self {
        Self { kind, snapshot: Snapshot { todo, position } }
    }

    /// Id of the todo this entry acts on.
    #[must_use]
    pub fn id(&self) -> TodoId {
        self.snapshot.todo.id
    }
}

pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { undo: VecDeque::new(), redo: VecDeque::new(), capacity: capacity.max(1) }
    }

    /// Record a fresh action. Clears the redo stack.
    pub fn record(&mut self, entry: HistoryEntry) {
        push_bounded(&mut self.undo, entry, self.capacity);
        self.redo.clear();
    }

    /// The action the next undo would invert.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo.back()
    }

    /// The action the next redo would replay.
    #[must_use]
    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.redo.back()
    }

    /// Move the top undo entry onto the redo stack, replaced by `updated`
    /// (which carries any id the backend reassigned). No-op when empty.
    pub fn commit_undo(&mut self, updated: HistoryEntry) {
        if self.undo.pop_back().is_some() {
            push_bounded(&mut self.redo, updated, self.capacity);
        }
    }

    /// Move the top redo entry back onto the undo stack.
    pub fn commit_redo(&mut self, updated: HistoryEntry) {
        if self.redo.pop_back().is_some() {
            push_bounded(&mut self.undo, updated, self.capacity);
        }
    }

    /// Point every entry that referred to `old` at `new`.
    pub fn remap_id(&mut self, old: TodoId, new: TodoId) {
        for entry in self.undo.iter_mut().chain(self.redo.iter_mut()) {
            if entry.snapshot.todo.id == old {
                entry.snapshot.todo.id = new;
            }
        }
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Undo entries, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo.iter()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, capacity: usize) {
    stack.push_back(entry);
    while stack.len() > capacity {
        stack.pop_front();
    }
}
