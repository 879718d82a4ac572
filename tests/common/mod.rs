//! Shared fixtures for the integration suites: recording handlers, a fake
//! tabular source, and driver construction over the in-memory adapters.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use longrun::{
    ContinuationStore, Cursor, ExecutionDriver, InMemoryContinuationStore, InMemoryTimerRegistrar,
    ItemHandler, ItemOutcome, RowSource, RunOptions, StopSignal, StoreError,
};

/// Handler that records every item it sees, optionally stopping or failing
/// when it reaches a designated item.
pub struct RecordingHandler {
    seen: Mutex<Vec<u64>>,
    stop_at: Option<u64>,
    fail_at: Option<u64>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            stop_at: None,
            fail_at: None,
        }
    }

    pub fn stopping_at(item: u64) -> Self {
        Self {
            stop_at: Some(item),
            ..Self::new()
        }
    }

    pub fn failing_at(item: u64) -> Self {
        Self {
            fail_at: Some(item),
            ..Self::new()
        }
    }

    pub fn seen(&self) -> Vec<u64> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemHandler<u64> for RecordingHandler {
    async fn on_item(&self, item: u64) -> anyhow::Result<ItemOutcome> {
        if self.fail_at == Some(item) {
            anyhow::bail!("handler failure at item {item}");
        }
        self.seen.lock().unwrap().push(item);
        if self.stop_at == Some(item) {
            return Ok(ItemOutcome::Stop(
                StopSignal::new().with_message("stopped by test"),
            ));
        }
        Ok(ItemOutcome::Continue)
    }
}

/// Tabular source of `n` rows where row `i` materializes as `i`.
pub struct StaticRows(pub u64);

#[async_trait]
impl RowSource<u64> for StaticRows {
    fn row_count(&self) -> u64 {
        self.0
    }

    async fn fetch_row(&self, offset: u64) -> anyhow::Result<u64> {
        Ok(offset)
    }
}

/// Store whose writes always fail, for exercising checkpoint failure paths.
pub struct RejectingStore;

#[async_trait]
impl ContinuationStore for RejectingStore {
    async fn put(&self, _id: &str, _cursor: &Cursor) -> Result<(), StoreError> {
        Err(StoreError::Backend("property store unavailable".to_string()))
    }

    async fn get(&self, _id: &str) -> Result<Option<Cursor>, StoreError> {
        Ok(None)
    }

    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

pub fn driver_with_quota(
    quota: usize,
) -> (
    ExecutionDriver,
    Arc<InMemoryContinuationStore>,
    Arc<InMemoryTimerRegistrar>,
) {
    let store = Arc::new(InMemoryContinuationStore::new());
    let timers = Arc::new(InMemoryTimerRegistrar::with_quota(quota));
    let driver = ExecutionDriver::new(store.clone(), timers.clone());
    (driver, store, timers)
}

pub fn test_driver() -> (
    ExecutionDriver,
    Arc<InMemoryContinuationStore>,
    Arc<InMemoryTimerRegistrar>,
) {
    driver_with_quota(20)
}

/// Options whose budget is already spent after the first item, forcing a
/// checkpoint on every leg that still has work left.
pub fn single_item_budget() -> RunOptions {
    RunOptions::default().with_timeout_budget(Duration::ZERO)
}
