#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Longrun
//!
//! Checkpoint/resume continuation core for batch jobs that must outlive a
//! hard wall-clock execution limit imposed by their host runtime.
//!
//! ## Overview
//!
//! A caller supplies a sequence of work items (a fixed list, a bounded
//! tabular source, or a token-paginated request) and a per-item callback.
//! [`ExecutionDriver::run`] drives the callback over the items until the
//! sequence is exhausted, the callback signals an early stop, or the time
//! budget runs out. In the last case the driver persists exactly where it
//! stopped and registers a one-shot timer that re-invokes the same entry
//! point later, resuming from the saved position with no gaps and no
//! duplicates. [`ExecutionDriver::run_in_parallel`] fans a bounded range
//! out into up to 2^k independently scheduled continuation chains.
//!
//! ## Architecture
//!
//! Each invocation leg is independent and stateless: all continuation state
//! crosses leg boundaries through two injected collaborators, a
//! [`ContinuationStore`] holding the serialized cursor and a
//! [`TimerRegistrar`] holding the pending one-shot registration. Both ship
//! with in-memory implementations for tests and local development.
//!
//! ## Module Organization
//!
//! - [`driver`] - `run` / `run_in_parallel` orchestration
//! - [`iterator`] - restartable position-aware iteration
//! - [`cursor`] - the persisted position/bound record
//! - [`source`] - the three source kinds and their adapter traits
//! - [`splitter`] - recursive range halving for parallel fan-out
//! - [`store`] / [`timer`] - host adapter contracts and in-memory fakes
//! - [`config`] - per-invocation run options
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use longrun::{
//!     ExecutionDriver, InMemoryContinuationStore, InMemoryTimerRegistrar, ItemHandler,
//!     ItemOutcome, RunOptions, SourceSpec, TriggerEvent,
//! };
//!
//! struct PrintHandler;
//!
//! #[async_trait::async_trait]
//! impl ItemHandler<u64> for PrintHandler {
//!     async fn on_item(&self, item: u64) -> anyhow::Result<ItemOutcome> {
//!         println!("processing {item}");
//!         Ok(ItemOutcome::Continue)
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = ExecutionDriver::new(
//!     Arc::new(InMemoryContinuationStore::new()),
//!     Arc::new(InMemoryTimerRegistrar::new()),
//! );
//!
//! // The host calls this with the trigger's event descriptor; a fresh
//! // start has no continuation id, a resumption carries one.
//! let event: Option<TriggerEvent> = None;
//! let registration = driver
//!     .run(
//!         "drain_backlog",
//!         event.as_ref(),
//!         SourceSpec::items((0u64..10_000).collect()),
//!         &PrintHandler,
//!         &RunOptions::default(),
//!     )
//!     .await?;
//!
//! if let Some(registration) = registration {
//!     println!("interrupted; continues as {}", registration.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod iterator;
pub mod logging;
pub mod source;
pub mod splitter;
pub mod store;
pub mod timer;

pub use config::RunOptions;
pub use cursor::{Cursor, Position};
pub use driver::{ExecutionDriver, ItemHandler, ItemOutcome, StopSignal, TriggerEvent};
pub use error::{LongrunError, Result};
pub use iterator::RestartableIter;
pub use source::{PageFetcher, PageResponse, RowSource, SourceSpec};
pub use splitter::{split_range, Segment};
pub use store::{ContinuationStore, InMemoryContinuationStore, StoreError};
pub use timer::{InMemoryTimerRegistrar, TimerError, TimerRegistrar, TimerRegistration};
