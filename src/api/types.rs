//! Wire types for the todo REST backend.

use board::doc::{PartialTodo, Todo, TodoId};
use board::geom::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Response { status: u16, body: String },

    /// The response body did not decode.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// A todo as the backend stores it. `id` is absent only on malformed rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
}

impl TodoRecord {
    #[must_use]
    pub fn from_todo(todo: &Todo, position: Option<Point>) -> Self {
        Self {
            id: Some(todo.id),
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
            position_x: position.map(|p| p.x),
            position_y: position.map(|p| p.y),
        }
    }

    /// Persisted position, when both coordinates are present.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        Some(Point::new(self.position_x?, self.position_y?))
    }

    /// Engine content plus persisted position. `None` without an id.
    #[must_use]
    pub fn into_todo(self) -> Option<(Todo, Option<Point>)> {
        let position = self.position();
        let id = self.id?;
        let todo = Todo { id, title: self.title, description: self.description, completed: self.completed };
        Some((todo, position))
    }

    /// Content fields as an engine update, leaving position alone.
    #[must_use]
    pub fn content_update(&self) -> PartialTodo {
        PartialTodo {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            completed: Some(self.completed),
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
}

impl NewTodo {
    #[must_use]
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self { title: title.into(), description, completed: false, position_x: None, position_y: None }
    }

    /// Re-create a deleted todo exactly as it was.
    #[must_use]
    pub fn from_snapshot(todo: &Todo, position: Option<Point>) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: todo.completed,
            position_x: position.map(|p| p.x),
            position_y: position.map(|p| p.y),
        }
    }

    #[must_use]
    pub fn at(mut self, position: Point) -> Self {
        self.position_x = Some(position.x);
        self.position_y = Some(position.y);
        self
    }
}

/// Body of a partial update. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
}

impl TodoPatch {
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self { completed: Some(completed), ..Self::default() }
    }

    #[must_use]
    pub fn position(position: Point) -> Self {
        Self { position_x: Some(position.x), position_y: Some(position.y), ..Self::default() }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
