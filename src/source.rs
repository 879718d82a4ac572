//! # Item Sources
//!
//! A run draws its work items from exactly one of three sources: a fixed
//! list held in memory, a bounded tabular source materialized one row at a
//! time, or an unbounded token-paginated request. The tabular and paginated
//! variants are host collaborators and are consumed through narrow async
//! traits so tests can substitute in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{LongrunError, Result};

/// One page of a token-paginated source: the payload for a single callback
/// invocation plus the token for the page after it.
#[derive(Debug, Clone)]
pub struct PageResponse<T> {
    pub value: T,
    /// Token for the next page; `None` signals end of sequence.
    pub next_token: Option<String>,
}

/// Bounded tabular source addressed by row offset.
#[async_trait]
pub trait RowSource<T>: Send + Sync {
    /// Total row count. Captured once when an iterator is constructed and
    /// not re-queried while iterating.
    fn row_count(&self) -> u64;

    async fn fetch_row(&self, offset: u64) -> anyhow::Result<T>;
}

/// Unbounded token-paginated source.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Fetch the page at `token`; `None` requests the first page.
    async fn fetch_page(&self, token: Option<&str>) -> anyhow::Result<PageResponse<T>>;
}

/// Source selector for a run. Exactly one of the three fields may be
/// populated; anything else is a configuration error, rejected before any
/// iteration begins.
pub struct SourceSpec<T> {
    pub items: Option<Vec<T>>,
    pub rows: Option<Arc<dyn RowSource<T>>>,
    pub pages: Option<Arc<dyn PageFetcher<T>>>,
}

impl<T> Default for SourceSpec<T> {
    fn default() -> Self {
        Self {
            items: None,
            rows: None,
            pages: None,
        }
    }
}

impl<T> SourceSpec<T> {
    pub fn items(items: Vec<T>) -> Self {
        Self {
            items: Some(items),
            ..Self::default()
        }
    }

    pub fn rows(rows: Arc<dyn RowSource<T>>) -> Self {
        Self {
            rows: Some(rows),
            ..Self::default()
        }
    }

    pub fn pages(pages: Arc<dyn PageFetcher<T>>) -> Self {
        Self {
            pages: Some(pages),
            ..Self::default()
        }
    }

    /// Reject specs that do not name exactly one source kind.
    pub fn validate(&self) -> Result<()> {
        let kinds = usize::from(self.items.is_some())
            + usize::from(self.rows.is_some())
            + usize::from(self.pages.is_some());
        if kinds != 1 {
            return Err(LongrunError::Configuration(format!(
                "exactly one source kind must be supplied, got {kinds}"
            )));
        }
        Ok(())
    }

    /// Known total length, if the source is bounded.
    pub fn bound(&self) -> Option<u64> {
        if let Some(items) = &self.items {
            return Some(items.len() as u64);
        }
        if let Some(rows) = &self.rows {
            return Some(rows.row_count());
        }
        None
    }
}
