//! # Restartable Iterator
//!
//! A position-aware lazy sequence over one of the three source kinds. A
//! fresh iterator seeded with a previously saved [`Cursor`] resumes at the
//! exact next unconsumed item, with no gaps or duplicates, provided the
//! underlying source is stable between legs.

use std::sync::Arc;

use crate::cursor::{Cursor, Position};
use crate::error::{LongrunError, Result};
use crate::source::{PageFetcher, RowSource, SourceSpec};

pub enum RestartableIter<T> {
    List(ListIter<T>),
    Rows(RowIter<T>),
    Pages(PageIter<T>),
}

pub struct ListIter<T> {
    items: std::iter::Skip<std::vec::IntoIter<T>>,
    position: u64,
    end: u64,
}

pub struct RowIter<T> {
    source: Arc<dyn RowSource<T>>,
    position: u64,
    end: u64,
}

pub struct PageIter<T> {
    source: Arc<dyn PageFetcher<T>>,
    token: Option<String>,
    finished: bool,
}

/// Resolve the `[start, end)` window for a bounded source of `len` items,
/// merging in a saved cursor when one exists. A saved bound larger than the
/// source's current length means the source shrank since the checkpoint;
/// iterating past it would read rows that no longer exist.
fn bounded_window(saved: Option<Cursor>, len: u64) -> Result<(u64, u64)> {
    match saved {
        None => Ok((0, len)),
        Some(Cursor {
            position: Position::Offset(position),
            bound,
        }) => {
            let end = bound.unwrap_or(len);
            if end > len {
                return Err(LongrunError::BoundDrift {
                    saved: end,
                    current: len,
                });
            }
            Ok((position, end))
        }
        Some(Cursor {
            position: Position::Token(_),
            ..
        }) => Err(LongrunError::CursorMismatch(
            "token cursor replayed into a bounded source".to_string(),
        )),
    }
}

impl<T> RestartableIter<T> {
    /// Build an iterator from a source spec, optionally seeded with a saved
    /// cursor. Rejects specs that do not name exactly one source kind and
    /// cursors whose shape does not match the source.
    pub fn new(spec: SourceSpec<T>, saved: Option<Cursor>) -> Result<Self> {
        spec.validate()?;
        let SourceSpec { items, rows, pages } = spec;
        match (items, rows, pages) {
            (Some(items), None, None) => {
                let len = items.len() as u64;
                let (position, end) = bounded_window(saved, len)?;
                Ok(Self::List(ListIter {
                    items: items.into_iter().skip(position as usize),
                    position,
                    end,
                }))
            }
            (None, Some(source), None) => {
                let len = source.row_count();
                let (position, end) = bounded_window(saved, len)?;
                Ok(Self::Rows(RowIter {
                    source,
                    position,
                    end,
                }))
            }
            (None, None, Some(source)) => {
                let token = match saved {
                    None => None,
                    Some(Cursor {
                        position: Position::Token(token),
                        ..
                    }) => token,
                    Some(Cursor {
                        position: Position::Offset(_),
                        ..
                    }) => {
                        return Err(LongrunError::CursorMismatch(
                            "offset cursor replayed into a paginated source".to_string(),
                        ))
                    }
                };
                Ok(Self::Pages(PageIter {
                    source,
                    token,
                    finished: false,
                }))
            }
            _ => Err(LongrunError::Configuration(
                "exactly one source kind must be supplied".to_string(),
            )),
        }
    }

    /// Produce the next item, or `None` once the window or page chain is
    /// exhausted.
    pub async fn advance(&mut self) -> Result<Option<T>> {
        match self {
            Self::List(it) => {
                if it.position >= it.end {
                    return Ok(None);
                }
                match it.items.next() {
                    Some(item) => {
                        it.position += 1;
                        Ok(Some(item))
                    }
                    None => Ok(None),
                }
            }
            Self::Rows(it) => {
                if it.position >= it.end {
                    return Ok(None);
                }
                let row = it
                    .source
                    .fetch_row(it.position)
                    .await
                    .map_err(LongrunError::Source)?;
                it.position += 1;
                Ok(Some(row))
            }
            Self::Pages(it) => {
                if it.finished {
                    return Ok(None);
                }
                let page = it
                    .source
                    .fetch_page(it.token.as_deref())
                    .await
                    .map_err(LongrunError::Source)?;
                it.token = page.next_token;
                if it.token.is_none() {
                    it.finished = true;
                }
                Ok(Some(page.value))
            }
        }
    }

    /// Snapshot of the next unconsumed position, suitable for persistence.
    pub fn cursor(&self) -> Cursor {
        match self {
            Self::List(it) => Cursor::segment(it.position, it.end),
            Self::Rows(it) => Cursor::segment(it.position, it.end),
            Self::Pages(it) => Cursor {
                position: Position::Token(it.token.clone()),
                bound: None,
            },
        }
    }

    pub fn exhausted(&self) -> bool {
        match self {
            Self::List(it) => it.position >= it.end,
            Self::Rows(it) => it.position >= it.end,
            Self::Pages(it) => it.finished,
        }
    }
}
