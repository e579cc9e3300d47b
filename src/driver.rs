//! Driver: the scheduler around a [`Session`].
//!
//! DESIGN
//! ======
//! The engine never schedules anything itself. `settle` calls
//! [`Engine::tick`](board::engine::Engine::tick) from a tokio interval with
//! the measured elapsed time until the board comes to rest, then flushes every
//! position in one batch. `replay` feeds a recorded JSON-lines input stream
//! through the engine on simulated time, one fixed tick after each event, so
//! a recording plays back identically regardless of wall time.

use std::io::BufRead;
use std::time::Duration;

use board::input::InputEvent;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::session::{ApplyReport, Session, SyncReport};

pub const DEFAULT_TICK_MS: u64 = 16;
pub const DEFAULT_MAX_TICKS: usize = 600;

/// Largest per-tick displacement, in pixels, still counted as at rest.
pub const REST_TOLERANCE: f64 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid event: {source}")]
    Event { line: usize, source: serde_json::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettleReport {
    pub ticks: usize,
    pub at_rest: bool,
    pub sync: SyncReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub events: usize,
    pub ticks: usize,
    pub at_rest: bool,
    pub applied: ApplyReport,
    /// History depth after the replay, for checking undo/redo traffic.
    pub undo_len: usize,
    pub redo_len: usize,
}

/// Parse one [`InputEvent`] per line. Blank lines and `#` comments are
/// skipped.
///
/// # Errors
///
/// [`ReplayError::Io`] if reading fails, [`ReplayError::Event`] with the
/// 1-based line number for the first line that does not decode.
pub fn parse_events(reader: impl BufRead) -> Result<Vec<InputEvent>, ReplayError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| ReplayError::Event { line: index + 1, source })?;
        events.push(event);
    }
    Ok(events)
}

/// Tick on a real interval until the board is at rest or `max_ticks`
/// elapse, then flush every position.
pub async fn settle(session: &mut Session, max_ticks: usize, tick_ms: u64) -> SettleReport {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = interval.tick().await;

    let mut ticks = 0;
    let mut at_rest = false;
    while !at_rest && ticks < max_ticks {
        let now = interval.tick().await;
        let dt_ms = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;

        let actions = session.engine_mut().tick(dt_ms);
        session.apply_actions(actions).await;
        ticks += 1;
        at_rest = session.engine().is_at_rest(REST_TOLERANCE);
    }

    let sync = session.sync_all_positions().await;
    debug!(ticks, at_rest, sent = sync.sent, failed = sync.failed, "settle finished");
    SettleReport { ticks, at_rest, sync }
}

/// Feed recorded events through the engine, executing the resulting actions.
/// Each non-tick event is followed by one simulated tick of `tick_ms`; after
/// the last event the board keeps ticking until at rest or `max_ticks`.
pub async fn replay(session: &mut Session, events: Vec<InputEvent>, tick_ms: u64, max_ticks: usize) -> ReplayReport {
    let dt_ms = millis(tick_ms);
    let mut report = ReplayReport::default();

    for event in events {
        let is_tick = matches!(event, InputEvent::Tick { .. });
        let actions = session.engine_mut().dispatch(event);
        report.applied += session.apply_actions(actions).await;
        report.events += 1;
        if is_tick {
            report.ticks += 1;
            continue;
        }
        let actions = session.engine_mut().tick(dt_ms);
        report.applied += session.apply_actions(actions).await;
        report.ticks += 1;
    }

    let mut drained = 0;
    while !session.engine().is_at_rest(REST_TOLERANCE) && drained < max_ticks {
        let actions = session.engine_mut().tick(dt_ms);
        report.applied += session.apply_actions(actions).await;
        drained += 1;
    }
    report.ticks += drained;
    report.at_rest = session.engine().is_at_rest(REST_TOLERANCE);
    report.undo_len = session.history().undo_len();
    report.redo_len = session.history().redo_len();

    debug!(events = report.events, ticks = report.ticks, at_rest = report.at_rest, "replay finished");
    report
}

fn millis(ms: u64) -> f64 {
    Duration::from_millis(ms).as_secs_f64() * 1000.0
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
