//! # Range Splitter
//!
//! Recursive halving of an index range into up to 2^k segments for parallel
//! fan-out. Halving, rather than equal k-way slicing, bounds the recursion
//! depth by the split factor and handles ranges that are not evenly
//! divisible; the `mid <= 1` guard keeps degenerate empty or singleton left
//! halves from consuming a timer slot.
//!
//! Splitting is pure and deterministic. Registration of the resulting
//! segments is the driver's job, so the same split can be re-derived
//! without side effects.

use serde::{Deserialize, Serialize};

/// Contiguous half-open sub-range `[start, end)` of a bounded source,
/// assigned to one continuation in parallel fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Partition `[start, end)` into at most 2^remaining_splits segments.
pub fn split_range(start: u64, end: u64, remaining_splits: u8) -> Vec<Segment> {
    let section = end - start;
    let mid = section / 2;
    if remaining_splits == 0 || mid <= 1 {
        return vec![Segment { start, end }];
    }
    let mut segments = split_range(start, start + mid, remaining_splits - 1);
    segments.extend(split_range(start + mid, end, remaining_splits - 1));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_factor_zero_yields_whole_range() {
        assert_eq!(split_range(0, 17, 0), vec![Segment { start: 0, end: 17 }]);
    }

    #[test]
    fn test_seventeen_items_two_splits() {
        let segments = split_range(0, 17, 2);
        assert_eq!(
            segments,
            vec![
                Segment { start: 0, end: 4 },
                Segment { start: 4, end: 8 },
                Segment { start: 8, end: 12 },
                Segment { start: 12, end: 17 },
            ]
        );
    }

    #[test]
    fn test_tiny_ranges_do_not_split() {
        assert_eq!(split_range(0, 1, 4), vec![Segment { start: 0, end: 1 }]);
        assert_eq!(split_range(0, 2, 4), vec![Segment { start: 0, end: 2 }]);
        assert_eq!(split_range(0, 3, 4), vec![Segment { start: 0, end: 3 }]);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(split_range(3, 250, 4), split_range(3, 250, 4));
    }

    proptest! {
        #[test]
        fn prop_segments_cover_range_exactly(
            start in 0u64..1000,
            len in 0u64..10_000,
            splits in 0u8..=4,
        ) {
            let end = start + len;
            let segments = split_range(start, end, splits);

            prop_assert!(segments.len() <= 1usize << splits);

            // Contiguous, in order, covering [start, end) with no overlap.
            let mut expected_start = start;
            for segment in &segments {
                prop_assert_eq!(segment.start, expected_start);
                prop_assert!(segment.end >= segment.start);
                expected_start = segment.end;
            }
            prop_assert_eq!(expected_start, end);
        }
    }
}
