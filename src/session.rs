//! Session: the host side of the engine.
//!
//! DESIGN
//! ======
//! A `Session` owns one [`Engine`], one [`History`], and one [`TodoApi`].
//! The engine decides *what* should happen and says so through [`Action`]s;
//! the session performs the network half and then mirrors the result
//! locally. Every remote call is awaited in sequence on the caller's task, so
//! no two mutations of the same session overlap.
//!
//! Undo and redo peek the top history entry, run its inverse remotely, and
//! only commit the stack move once the call succeeded. A failed call leaves
//! both stacks exactly as they were. Position syncs are optimistic: a
//! rejected PUT is logged and the local position is kept.

use std::sync::Arc;

use board::doc::{Todo, TodoId};
use board::engine::{Action, Engine};
use board::geom::Point;
use board::history::{History, HistoryEntry, HistoryKind};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiError, NewTodo, TodoApi, TodoPatch};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("unknown todo {0}")]
    UnknownTodo(TodoId),

    #[error("backend returned a todo without an id")]
    MissingId,
}

/// Tally of one [`Session::apply_actions`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub positions_synced: usize,
    pub toggled: usize,
    pub deleted: usize,
    pub undone: usize,
    pub redone: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for ApplyReport {
    fn add_assign(&mut self, other: Self) {
        self.positions_synced += other.positions_synced;
        self.toggled += other.toggled;
        self.deleted += other.deleted;
        self.undone += other.undone;
        self.redone += other.redone;
        self.failed += other.failed;
    }
}

/// Outcome of a position flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct Session {
    engine: Engine,
    history: History,
    api: Arc<dyn TodoApi>,
}

impl Session {
    #[must_use]
    pub fn new(engine: Engine, api: Arc<dyn TodoApi>) -> Self {
        Self { engine, history: History::new(), api }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    // =========================================================================
    // LOAD
    // =========================================================================

    /// Replace the board with the backend's todos. Records without an id are
    /// skipped. Todos without a stored position are laid out on the grid;
    /// those positions stay local until the next flush. Returns the number
    /// of todos loaded.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Api`] if the list call fails.
    pub async fn load(&mut self) -> Result<usize, SyncError> {
        let records = self
            .api
            .list()
            .await
            .inspect_err(|e| warn!(error = %e, "load: list failed"))?;

        let total = records.len();
        let todos: Vec<_> = records.into_iter().filter_map(|r| r.into_todo()).collect();
        if todos.len() < total {
            debug!(skipped = total - todos.len(), "load: skipping records without id");
        }

        let count = todos.len();
        let placed = self.engine.load_snapshot(todos);
        self.history.clear();
        info!(count, placed = placed.len(), "loaded todos");
        Ok(count)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a todo at a random on-screen position and put it on top.
    ///
    /// # Errors
    ///
    /// [`SyncError::EmptyTitle`] for a blank title (no request is made),
    /// [`SyncError::Api`] if the create call fails, [`SyncError::MissingId`]
    /// if the backend answers without an id.
    pub async fn create(&mut self, title: &str, description: Option<&str>) -> Result<TodoId, SyncError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SyncError::EmptyTitle);
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty()).map(String::from);
        let position = self.engine.store.random_position();

        let record = self
            .api
            .create(&NewTodo::new(title, description).at(position))
            .await
            .inspect_err(|e| warn!(error = %e, "create failed"))?;
        let (todo, stored) = record.into_todo().ok_or(SyncError::MissingId)?;

        let id = todo.id;
        let placed = self.engine.insert_todo(todo.clone(), Some(stored.unwrap_or(position)));
        self.engine.close_prompt();
        self.history.record(HistoryEntry::new(HistoryKind::Create, todo, Some(placed)));
        info!(id, "created todo");
        Ok(id)
    }

    /// Flip completion. The server's answer replaces content fields; position
    /// and stacking order stay local. Returns the new completion state.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownTodo`] for ids the engine does not hold,
    /// [`SyncError::Api`] if the update fails.
    pub async fn toggle(&mut self, id: TodoId) -> Result<bool, SyncError> {
        let (before, position) = self.known(id, "toggle")?;
        let prior = before.completed;
        let completed = self.set_completed(id, !prior).await?;
        self.history.record(HistoryEntry::new(HistoryKind::Toggle { prior }, before, position));
        info!(id, completed, "toggled todo");
        Ok(completed)
    }

    /// Delete remotely, then purge locally.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownTodo`] for ids the engine does not hold,
    /// [`SyncError::Api`] if the delete fails.
    pub async fn delete(&mut self, id: TodoId) -> Result<(), SyncError> {
        let (todo, position) = self.known(id, "delete")?;
        self.api
            .delete(id)
            .await
            .inspect_err(|e| warn!(id, error = %e, "delete failed"))?;
        self.engine.remove_todo(id);
        self.history.record(HistoryEntry::new(HistoryKind::Delete, todo, position));
        info!(id, "deleted todo");
        Ok(())
    }

    // =========================================================================
    // UNDO / REDO
    // =========================================================================

    /// Reverse the most recent operation. `Ok(false)` when there is nothing
    /// to undo.
    ///
    /// # Errors
    ///
    /// Returns the remote failure; both stacks are left untouched.
    pub async fn undo(&mut self) -> Result<bool, SyncError> {
        let Some(mut entry) = self.history.peek_undo().cloned() else {
            return Ok(false);
        };
        match entry.kind {
            HistoryKind::Create => self.take_down(&mut entry).await?,
            HistoryKind::Delete => self.bring_back(&mut entry).await?,
            HistoryKind::Toggle { prior } => {
                self.set_completed(entry.id(), prior).await?;
            }
        }
        info!(id = entry.id(), kind = ?entry.kind, "undid");
        self.history.commit_undo(entry);
        Ok(true)
    }

    /// Re-apply the most recently undone operation. `Ok(false)` when there is
    /// nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns the remote failure; both stacks are left untouched.
    pub async fn redo(&mut self) -> Result<bool, SyncError> {
        let Some(mut entry) = self.history.peek_redo().cloned() else {
            return Ok(false);
        };
        match entry.kind {
            HistoryKind::Create => self.bring_back(&mut entry).await?,
            HistoryKind::Delete => self.take_down(&mut entry).await?,
            HistoryKind::Toggle { prior } => {
                self.set_completed(entry.id(), !prior).await?;
            }
        }
        info!(id = entry.id(), kind = ?entry.kind, "redid");
        self.history.commit_redo(entry);
        Ok(true)
    }

    // =========================================================================
    // POSITIONS
    // =========================================================================

    /// One PUT per known id. Failures are logged and counted; the local
    /// position is kept either way.
    pub async fn sync_positions(&mut self, positions: &[(TodoId, Point)]) -> SyncReport {
        let mut report = SyncReport::default();
        for &(id, position) in positions {
            if !self.engine.store.contains(id) {
                debug!(id, "sync: skipping unknown todo");
                report.skipped += 1;
                continue;
            }
            match self.api.update(id, &TodoPatch::position(position)).await {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    warn!(id, error = %e, "position sync failed");
                    report.failed += 1;
                }
            }
        }
        debug!(sent = report.sent, skipped = report.skipped, failed = report.failed, "flushed positions");
        report
    }

    /// Flush every card's current position.
    pub async fn sync_all_positions(&mut self) -> SyncReport {
        let positions = self.engine.store.positions();
        self.sync_positions(&positions).await
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Carry out engine actions in order.
    pub async fn apply_actions(&mut self, actions: Vec<Action>) -> ApplyReport {
        let mut report = ApplyReport::default();
        for action in actions {
            match action {
                Action::SyncPositions(positions) => {
                    let sync = self.sync_positions(&positions).await;
                    report.positions_synced += sync.sent;
                    report.failed += sync.failed;
                }
                Action::ToggleRequested(id) => tally(self.toggle(id).await, &mut report.toggled, &mut report.failed),
                Action::DeleteRequested(id) => tally(self.delete(id).await, &mut report.deleted, &mut report.failed),
                Action::UndoRequested => tally_step(self.undo().await, &mut report.undone, &mut report.failed),
                Action::RedoRequested => tally_step(self.redo().await, &mut report.redone, &mut report.failed),
                Action::CreatePromptRequested => {
                    // No prompt surface on this host; `add` covers creation.
                    debug!("create prompt requested; closing");
                    self.engine.close_prompt();
                }
                Action::DebugOverlayToggled(on) => debug!(on, "debug overlay"),
                Action::PromptClosed | Action::RenderNeeded => {}
            }
        }
        report
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn known(&self, id: TodoId, op: &str) -> Result<(Todo, Option<Point>), SyncError> {
        self.engine.snapshot(id).ok_or_else(|| {
            debug!(id, op, "skipping unknown todo");
            SyncError::UnknownTodo(id)
        })
    }

    async fn set_completed(&mut self, id: TodoId, completed: bool) -> Result<bool, SyncError> {
        let record = self
            .api
            .update(id, &TodoPatch::completed(completed))
            .await
            .inspect_err(|e| warn!(id, error = %e, "completion update failed"))?;
        self.engine.update_todo(id, &record.content_update());
        Ok(record.completed)
    }

    /// Delete the entry's todo remotely and locally, refreshing the snapshot
    /// so a later re-create restores its latest state.
    async fn take_down(&mut self, entry: &mut HistoryEntry) -> Result<(), SyncError> {
        let id = entry.id();
        self.api
            .delete(id)
            .await
            .inspect_err(|e| warn!(id, error = %e, "history delete failed"))?;
        if let Some((todo, position)) = self.engine.remove_todo(id) {
            entry.snapshot.todo = todo;
            entry.snapshot.position = position.or(entry.snapshot.position);
        }
        Ok(())
    }

    /// Re-create the entry's todo from its snapshot under a fresh id and
    /// point every history entry at that id.
    async fn bring_back(&mut self, entry: &mut HistoryEntry) -> Result<(), SyncError> {
        let old = entry.id();
        let body = NewTodo::from_snapshot(&entry.snapshot.todo, entry.snapshot.position);
        let record = self
            .api
            .create(&body)
            .await
            .inspect_err(|e| warn!(id = old, error = %e, "history re-create failed"))?;
        let (todo, stored) = record.into_todo().ok_or(SyncError::MissingId)?;

        let new = todo.id;
        let placed = self.engine.insert_todo(todo.clone(), stored.or(entry.snapshot.position));
        self.history.remap_id(old, new);
        entry.snapshot.todo = todo;
        entry.snapshot.position = Some(placed);
        debug!(old, new, "re-created todo");
        Ok(())
    }
}

fn tally<T>(result: Result<T, SyncError>, ok: &mut usize, failed: &mut usize) {
    match result {
        Ok(_) => *ok += 1,
        Err(SyncError::UnknownTodo(_)) => {}
        Err(_) => *failed += 1,
    }
}

fn tally_step(result: Result<bool, SyncError>, ok: &mut usize, failed: &mut usize) {
    match result {
        Ok(true) => *ok += 1,
        Ok(false) => debug!("history empty"),
        Err(_) => *failed += 1,
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use board::geom::Size;

    use crate::api::TodoRecord;

    /// In-memory backend that records every call and fails on demand.
    #[derive(Default)]
    pub struct MockApi {
        records: Mutex<BTreeMap<TodoId, TodoRecord>>,
        next_id: Mutex<TodoId>,
        calls: Mutex<Vec<String>>,
        failing: AtomicBool,
    }

    impl MockApi {
        pub fn with(records: Vec<TodoRecord>) -> Arc<Self> {
            let api = Self::default();
            {
                let mut stored = api.records.lock().unwrap();
                let mut next = api.next_id.lock().unwrap();
                for record in records {
                    if let Some(id) = record.id {
                        *next = (*next).max(id);
                        stored.insert(id, record);
                    } else {
                        // Unkeyed rows only show up through `list`.
                        let key = -1 - TodoId::try_from(stored.len()).unwrap();
                        stored.insert(key, record);
                    }
                }
            }
            Arc::new(api)
        }

        pub fn fail(&self, on: bool) {
            self.failing.store(on, Ordering::SeqCst);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn record(&self, id: TodoId) -> Option<TodoRecord> {
            self.records.lock().unwrap().get(&id).cloned()
        }

        pub fn stored_count(&self) -> usize {
            self.records.lock().unwrap().len()
        }

        fn log(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ApiError::Response { status: 500, body: "boom".into() });
            }
            Ok(())
        }

        fn not_found() -> ApiError {
            ApiError::Response { status: 404, body: "not found".into() }
        }
    }

    #[async_trait::async_trait]
    impl TodoApi for MockApi {
        async fn list(&self) -> Result<Vec<TodoRecord>, ApiError> {
            self.log("list".into())?;
            Ok(self.records.lock().unwrap().values().cloned().collect())
        }

        async fn create(&self, todo: &NewTodo) -> Result<TodoRecord, ApiError> {
            self.log("create".into())?;
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let record = TodoRecord {
                id: Some(*next),
                title: todo.title.clone(),
                description: todo.description.clone(),
                completed: todo.completed,
                position_x: todo.position_x,
                position_y: todo.position_y,
            };
            self.records.lock().unwrap().insert(*next, record.clone());
            Ok(record)
        }

        async fn update(&self, id: TodoId, patch: &TodoPatch) -> Result<TodoRecord, ApiError> {
            self.log(format!("update {id}"))?;
            let mut records = self.records.lock().unwrap();
            let record = records.get_mut(&id).ok_or_else(Self::not_found)?;
            if let Some(title) = &patch.title {
                record.title.clone_from(title);
            }
            if let Some(description) = &patch.description {
                record.description = Some(description.clone());
            }
            if let Some(completed) = patch.completed {
                record.completed = completed;
            }
            if patch.position_x.is_some() {
                record.position_x = patch.position_x;
                record.position_y = patch.position_y;
            }
            Ok(record.clone())
        }

        async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
            self.log(format!("delete {id}"))?;
            self.records
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or_else(Self::not_found)
        }
    }

    pub fn record(id: TodoId, title: &str, position: Option<(f64, f64)>) -> TodoRecord {
        TodoRecord {
            id: Some(id),
            title: title.into(),
            description: None,
            completed: false,
            position_x: position.map(|p| p.0),
            position_y: position.map(|p| p.1),
        }
    }

    /// Session over `api` with a 1280x800 viewport.
    #[must_use]
    pub fn session(api: &Arc<MockApi>) -> Session {
        let engine = Engine::new(Size::new(1280.0, 800.0));
        Session::new(engine, api.clone())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
