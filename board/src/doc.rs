//! Document model: todo content and the in-memory store that owns it.
//!
//! Positions and stacking order are not stored here; they live in the
//! [`crate::store::PositionStore`] so the simulation can mutate them without
//! touching content. A todo is present in both stores or in neither.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Backend-assigned todo identifier.
pub type TodoId = i64;

/// Content of a todo as the engine tracks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
}

/// Sparse content update. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialTodo {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

/// In-memory store of todo content.
pub struct DocStore {
    todos: HashMap<TodoId, Todo>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { todos: HashMap::new() }
    }

    /// Insert or replace a todo.
    pub fn insert(&mut self, todo: Todo) {
        self.todos.insert(todo.id, todo);
    }

    /// Remove a todo by id, returning it if it was present.
    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        self.todos.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.todos.contains_key(&id)
    }

    /// Apply a partial update. Returns false if the todo doesn't exist.
    pub fn apply_partial(&mut self, id: TodoId, partial: &PartialTodo) -> bool {
        let Some(todo) = self.todos.get_mut(&id) else {
            return false;
        };
        if let Some(title) = &partial.title {
            todo.title.clone_from(title);
        }
        if let Some(description) = &partial.description {
            todo.description.clone_from(description);
        }
        if let Some(completed) = partial.completed {
            todo.completed = completed;
        }
        true
    }

    /// Replace all todos with a full snapshot.
    pub fn load_snapshot(&mut self, todos: Vec<Todo>) {
        self.todos.clear();
        for todo in todos {
            self.todos.insert(todo.id, todo);
        }
    }

    /// All ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<TodoId> {
        let mut ids: Vec<TodoId> = self.todos.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}
