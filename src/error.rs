//! # Error Handling
//!
//! Crate-wide error taxonomy. Configuration, quota, and missing-continuation
//! errors are fatal and never retried; callback and source errors carry the
//! underlying failure through unchanged.

use crate::store::StoreError;
use crate::timer::TimerError;

#[derive(Debug, thiserror::Error)]
pub enum LongrunError {
    /// Invalid entry point, source selection, or options. Detected before
    /// any item is processed; never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parallel fan-out would exceed the host's outstanding-timer limit.
    /// The caller must reduce the split factor or free existing timers;
    /// the fan-out is never silently clamped.
    #[error("Timer quota exceeded: {requested} registrations requested, {available} slots available")]
    Quota { requested: usize, available: usize },

    /// A resumption event named a continuation id with no stored cursor.
    /// Signals external tampering or store data loss.
    #[error("No stored cursor for continuation '{0}'")]
    MissingContinuation(String),

    /// A bounded source shrank below the bound captured in a saved cursor.
    #[error("Source bound changed since checkpoint: saved {saved}, current {current}")]
    BoundDrift { saved: u64, current: u64 },

    /// A saved cursor was replayed into a source of a different kind.
    #[error("Cursor does not match source: {0}")]
    CursorMismatch(String),

    #[error("Continuation store error: {0}")]
    Store(#[from] StoreError),

    #[error("Timer registrar error: {0}")]
    Timer(#[from] TimerError),

    /// A row or page fetch against the underlying source failed.
    #[error("Source error: {0}")]
    Source(#[source] anyhow::Error),

    /// The per-item callback failed. Propagated unchanged; the cursor is
    /// not persisted and no continuation is scheduled on this path.
    #[error("Callback error: {0}")]
    Callback(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LongrunError>;
