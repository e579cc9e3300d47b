//! Remote sync adapter for the todo REST backend.
//!
//! DESIGN
//! ======
//! The session talks to the backend only through [`TodoApi`], so tests swap
//! in a recording mock. [`HttpTodoApi`] is the real implementation: one
//! request per call, no retry, no backoff. Non-2xx responses surface as
//! [`ApiError::Response`] regardless of status.

pub mod http;
pub mod types;

use async_trait::async_trait;
use board::doc::TodoId;

pub use http::HttpTodoApi;
pub use types::{ApiError, NewTodo, TodoPatch, TodoRecord};

/// CRUD surface of the todo backend.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// Fetch every todo.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    async fn list(&self) -> Result<Vec<TodoRecord>, ApiError>;

    /// Create a todo and return the stored record with its new id.
    ///
    /// # Errors
    ///
    /// As [`TodoApi::list`].
    async fn create(&self, todo: &NewTodo) -> Result<TodoRecord, ApiError>;

    /// Apply a partial update and return the stored record.
    ///
    /// # Errors
    ///
    /// As [`TodoApi::list`].
    async fn update(&self, id: TodoId, patch: &TodoPatch) -> Result<TodoRecord, ApiError>;

    /// Delete a todo.
    ///
    /// # Errors
    ///
    /// As [`TodoApi::list`].
    async fn delete(&self, id: TodoId) -> Result<(), ApiError>;
}
