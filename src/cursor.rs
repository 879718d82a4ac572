//! # Cursor Data Model
//!
//! The minimal state needed to resume an interrupted iteration: the next
//! unconsumed position plus an optional total bound. A cursor is the only
//! thing that crosses an invocation boundary; it is serialized to JSON text
//! in the continuation store and read back on the next leg.

use serde::{Deserialize, Serialize};

/// Where the next unconsumed item lives in the source sequence.
///
/// Serialized untagged, so the persisted shape is `number` for bounded
/// sources and `string | null` for paginated ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Position {
    /// Integer offset into a bounded sequence.
    Offset(u64),
    /// Opaque page token for a paginated sequence; `None` means the first
    /// page has not been requested yet.
    Token(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Index or token of the next unconsumed item.
    pub position: Position,
    /// Total known length; `None` until an end-of-sequence signal is seen
    /// on an unbounded source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<u64>,
}

impl Cursor {
    /// Cursor for a fresh pass over a bounded source of `bound` items.
    pub fn fresh_offset(bound: u64) -> Self {
        Self {
            position: Position::Offset(0),
            bound: Some(bound),
        }
    }

    /// Cursor for a fresh pass over a token-paginated source.
    pub fn fresh_token() -> Self {
        Self {
            position: Position::Token(None),
            bound: None,
        }
    }

    /// Cursor covering the half-open sub-range `[start, end)`.
    pub fn segment(start: u64, end: u64) -> Self {
        Self {
            position: Position::Offset(start),
            bound: Some(end),
        }
    }

    /// True once the position has reached the known bound.
    pub fn is_exhausted(&self) -> bool {
        match (&self.position, self.bound) {
            (Position::Offset(p), Some(b)) => *p >= b,
            _ => false,
        }
    }
}
