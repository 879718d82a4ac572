//! # Execution Driver
//!
//! Orchestrates a batch run under a hard wall-clock budget. An invocation
//! is either a fresh start or a resumption; the driver pulls items from a
//! restartable iterator, invokes the per-item callback, and when the budget
//! runs out with work remaining it checkpoints the cursor and registers a
//! one-shot timer to re-invoke the same entry point later.
//!
//! ## Architecture
//!
//! ```text
//! host trigger ──▶ entry point ──▶ ExecutionDriver::run
//!                                     │ resume? ── ContinuationStore::get/delete
//!                                     │            TimerRegistrar::cancel
//!                                     ├ item loop ─ ItemHandler::on_item
//!                                     └ timeout? ── TimerRegistrar::register
//!                                                   ContinuationStore::put
//! ```
//!
//! The store and registrar are injected collaborators, so tests substitute
//! in-memory fakes for both. There is no in-process state across legs; the
//! cursor in the store and the pending timer registration are the entire
//! continuation.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RunOptions;
use crate::constants::ANONYMOUS_ENTRY_POINT;
use crate::cursor::Cursor;
use crate::error::{LongrunError, Result};
use crate::iterator::RestartableIter;
use crate::logging::{log_error, log_run_operation};
use crate::source::SourceSpec;
use crate::splitter::split_range;
use crate::store::ContinuationStore;
use crate::timer::{TimerRegistrar, TimerRegistration};

/// Event descriptor a host trigger hands to an entry point. Carries a
/// continuation id when the invocation is a resumption; a missing id (or a
/// missing event altogether) means a fresh start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub continuation_id: Option<String>,
}

impl TriggerEvent {
    /// Event for a fresh start.
    pub fn fresh() -> Self {
        Self::default()
    }

    /// Event for a resumption of the given continuation.
    pub fn resumption<S: Into<String>>(id: S) -> Self {
        Self {
            continuation_id: Some(id.into()),
        }
    }
}

/// Graceful early-termination request from a per-item callback. Stop is not
/// a failure: the loop ends, no continuation is scheduled, and the run
/// returns successfully.
#[derive(Debug, Default)]
pub struct StopSignal {
    pub message: Option<String>,
    pub cause: Option<anyhow::Error>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_cause(mut self, cause: anyhow::Error) -> Self {
        self.cause = Some(cause);
        self
    }
}

/// Outcome of one per-item callback invocation.
///
/// Stopping is signalled through the return value, never by returning an
/// error: an `Err` from the callback always means failure and propagates to
/// the caller unchanged.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Keep iterating.
    Continue,
    /// End this segment's work now, without scheduling a continuation.
    Stop(StopSignal),
}

/// Per-item callback invoked by the driver for each item the iterator
/// produces.
#[async_trait]
pub trait ItemHandler<T>: Send + Sync {
    async fn on_item(&self, item: T) -> anyhow::Result<ItemOutcome>;
}

/// The `run` / `run_in_parallel` orchestrator. Stateless apart from its two
/// injected collaborators; everything that must survive a leg boundary
/// lives in the store and the registrar.
pub struct ExecutionDriver {
    store: Arc<dyn ContinuationStore>,
    timers: Arc<dyn TimerRegistrar>,
}

impl ExecutionDriver {
    pub fn new(store: Arc<dyn ContinuationStore>, timers: Arc<dyn TimerRegistrar>) -> Self {
        Self { store, timers }
    }

    /// Run the callback over the source until exhaustion, an early stop, or
    /// the time budget runs out. Returns the new continuation registration
    /// when the run was interrupted with work remaining, `None` otherwise.
    ///
    /// A `triggerEvent` carrying a continuation id makes this leg a
    /// resumption: the stored cursor seeds the iterator, and the stored
    /// record plus the prior timer registration are consumed before any
    /// item is processed.
    pub async fn run<T: Send + 'static>(
        &self,
        entry_point: &str,
        event: Option<&TriggerEvent>,
        source: SourceSpec<T>,
        handler: &dyn ItemHandler<T>,
        options: &RunOptions,
    ) -> Result<Option<TimerRegistration>> {
        validate_entry_point(entry_point)?;
        options.validate()?;
        // Source misconfiguration must be caught before the continuation is
        // consumed; otherwise a rejected resumption leg would destroy the
        // stored cursor along with it.
        source.validate()?;

        let saved = self.take_continuation(entry_point, event).await?;
        let mut iter = RestartableIter::new(source, saved)?;
        self.drive(entry_point, &mut iter, handler, options).await
    }

    /// Fan a bounded range out into up to 2^split_factor independently
    /// scheduled continuation chains.
    ///
    /// A fresh call executes no items: it partitions `[0, bound)` and
    /// registers one continuation per segment, returning all of them. A
    /// resumption call behaves exactly like [`run`](Self::run) restricted
    /// to the segment recorded for its continuation id.
    pub async fn run_in_parallel<T: Send + 'static>(
        &self,
        entry_point: &str,
        event: Option<&TriggerEvent>,
        source: SourceSpec<T>,
        handler: &dyn ItemHandler<T>,
        options: &RunOptions,
    ) -> Result<Vec<TimerRegistration>> {
        validate_entry_point(entry_point)?;
        options.validate()?;

        if event.is_some_and(|e| e.continuation_id.is_some()) {
            let registration = self.run(entry_point, event, source, handler, options).await?;
            return Ok(registration.into_iter().collect());
        }

        source.validate()?;
        let Some(bound) = source.bound() else {
            return Err(LongrunError::Configuration(
                "parallel fan-out requires a bounded source (items or rows)".to_string(),
            ));
        };

        // Never silently clamp: if the full fan-out does not fit in the
        // host's timer quota the caller must lower the split factor.
        let requested = 1usize << options.split_factor;
        let outstanding = self.timers.list_pending().await?.len();
        let available = self.timers.quota().saturating_sub(outstanding);
        if requested > available {
            return Err(LongrunError::Quota {
                requested,
                available,
            });
        }

        let segments = split_range(0, bound, options.split_factor);
        let mut registrations = Vec::with_capacity(segments.len());
        for segment in &segments {
            let cursor = Cursor::segment(segment.start, segment.end);
            registrations.push(self.checkpoint(entry_point, &cursor, options).await?);
        }

        let details = format!("{} segments over [0, {bound})", segments.len());
        log_run_operation("fan_out", entry_point, None, "registered", Some(details.as_str()));
        Ok(registrations)
    }

    /// Consume the continuation named by `event`, if any: read and delete
    /// the stored cursor, and delete the timer registration that fired.
    /// A supplied id with no stored cursor is fatal: the resumption
    /// contract was violated externally.
    async fn take_continuation(
        &self,
        entry_point: &str,
        event: Option<&TriggerEvent>,
    ) -> Result<Option<Cursor>> {
        let Some(id) = event.and_then(|e| e.continuation_id.as_deref()) else {
            return Ok(None);
        };
        let cursor = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LongrunError::MissingContinuation(id.to_string()))?;
        self.store.delete(id).await?;
        self.timers.cancel(id).await?;
        let details = format!("position {:?}", cursor.position);
        log_run_operation(
            "resume",
            entry_point,
            Some(id),
            "cursor_restored",
            Some(details.as_str()),
        );
        Ok(Some(cursor))
    }

    /// The item loop. Pulls until exhaustion, stop, or timeout; after each
    /// callback the elapsed wall-clock time is compared against the budget.
    /// The check runs between items only, so one long callback can
    /// overshoot the budget.
    async fn drive<T>(
        &self,
        entry_point: &str,
        iter: &mut RestartableIter<T>,
        handler: &dyn ItemHandler<T>,
        options: &RunOptions,
    ) -> Result<Option<TimerRegistration>> {
        let started = options.clock_start.unwrap_or_else(Instant::now);
        let mut timed_out = false;

        while let Some(item) = iter.advance().await? {
            let item_started = Instant::now();
            match handler.on_item(item).await.map_err(LongrunError::Callback)? {
                ItemOutcome::Continue => {}
                ItemOutcome::Stop(signal) => {
                    info!(
                        entry_point = %entry_point,
                        message = signal.message.as_deref(),
                        "⏹️ callback requested stop; no continuation scheduled"
                    );
                    return Ok(None);
                }
            }

            if options.debug {
                debug!(
                    target: "longrun::driver",
                    entry_point = %entry_point,
                    position = ?iter.cursor().position,
                    item_ms = item_started.elapsed().as_millis() as u64,
                    total_ms = started.elapsed().as_millis() as u64,
                    "item processed"
                );
            }

            if started.elapsed() > options.timeout_budget {
                timed_out = true;
                break;
            }
        }

        if timed_out && !iter.exhausted() {
            let registration = self
                .checkpoint(entry_point, &iter.cursor(), options)
                .await?;
            return Ok(Some(registration));
        }
        Ok(None)
    }

    /// Register a one-shot timer for `entry_point`, then persist `cursor`
    /// under the returned id. Registration comes first so the id exists
    /// before anything is stored under it.
    async fn checkpoint(
        &self,
        entry_point: &str,
        cursor: &Cursor,
        options: &RunOptions,
    ) -> Result<TimerRegistration> {
        let registration = self
            .timers
            .register(entry_point, options.resume_delay)
            .await?;
        // Roll the timer back if the cursor write fails; a registration
        // without a stored cursor fires into MissingContinuation later.
        if let Err(put_error) = self.store.put(&registration.id, cursor).await {
            if let Err(cancel_error) = self.timers.cancel(&registration.id).await {
                log_error(
                    "driver",
                    "checkpoint",
                    &cancel_error.to_string(),
                    Some("orphan timer left pending after failed cursor write"),
                );
            }
            return Err(put_error.into());
        }
        let details = format!(
            "position {:?}, fires {}",
            cursor.position, registration.fire_at
        );
        log_run_operation(
            "checkpoint",
            entry_point,
            Some(registration.id.as_str()),
            "registered",
            Some(details.as_str()),
        );
        Ok(registration)
    }
}

/// A timer can only address a named function; reject empty names and the
/// host's anonymous-function sentinel.
fn validate_entry_point(name: &str) -> Result<()> {
    if name.trim().is_empty() || name == ANONYMOUS_ENTRY_POINT {
        return Err(LongrunError::Configuration(format!(
            "entry point must be a named function, got '{name}'"
        )));
    }
    Ok(())
}
