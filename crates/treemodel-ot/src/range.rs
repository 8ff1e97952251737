//! Ranges between two positions and their set-like arithmetic.

use std::fmt;

use crate::position::{Position, RootId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering `shift` nodes after `start`, on the same level.
    pub fn from_position_and_shift(start: &Position, shift: usize) -> Self {
        Self {
            start: start.clone(),
            end: start.with_offset(start.offset().saturating_add(shift)),
        }
    }

    pub fn root(&self) -> &RootId {
        &self.start.root
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Both boundaries sit in the same parent node.
    pub fn is_flat(&self) -> bool {
        self.start.has_same_parent_as(&self.end)
    }

    /// Number of slots between the boundaries. Only meaningful for flat ranges.
    pub fn width(&self) -> usize {
        self.end.offset().saturating_sub(self.start.offset())
    }

    /// Strict containment: boundaries themselves are not inside.
    pub fn contains_position(&self, position: &Position) -> bool {
        position.is_after(&self.start) && position.is_before(&self.end)
    }

    pub fn contains_range(&self, other: &Range) -> bool {
        self.root() == other.root()
            && !other.start.is_before(&self.start)
            && !other.end.is_after(&self.end)
    }

    pub fn is_intersecting(&self, other: &Range) -> bool {
        self.start.is_before(&other.end) && self.end.is_after(&other.start)
    }

    /// Parts of this range not covered by `other`, in document order.
    ///
    /// Yields two ranges exactly when `other` is strictly nested inside this
    /// range.
    pub fn difference(&self, other: &Range) -> Vec<Range> {
        if !self.is_intersecting(other) {
            return vec![self.clone()];
        }
        let mut ranges = Vec::with_capacity(2);
        if self.contains_position(&other.start) {
            ranges.push(Range::new(self.start.clone(), other.start.clone()));
        }
        if self.contains_position(&other.end) {
            ranges.push(Range::new(other.end.clone(), self.end.clone()));
        }
        ranges
    }

    /// The part shared with `other`, if any.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        if !self.is_intersecting(other) {
            return None;
        }
        let start = if self.contains_position(&other.start) {
            other.start.clone()
        } else {
            self.start.clone()
        };
        let end = if self.contains_position(&other.end) {
            other.end.clone()
        } else {
            self.end.clone()
        };
        Some(Range::new(start, end))
    }

    /// This range after `count` nodes were inserted at `insert`.
    ///
    /// When the insertion point lies strictly inside the range, on the level
    /// of its start, the range is spread into two pieces around the new
    /// nodes. Otherwise the boundaries are shifted so that nodes inserted
    /// exactly at either boundary stay outside.
    pub fn transformed_by_insertion(&self, insert: &Position, count: usize) -> Vec<Range> {
        if self.contains_position(insert) && insert.has_same_parent_as(&self.start) {
            return self.spread_around(insert, count);
        }
        self.shifted_by_insertion(insert, count)
    }

    /// Like [`Range::transformed_by_insertion`], but also spreads around
    /// insertions nested inside nodes the range covers.
    ///
    /// Attribute ranges use this: inserted content never becomes part of
    /// them, whatever its depth.
    pub fn spread_by_insertion(&self, insert: &Position, count: usize) -> Vec<Range> {
        if self.contains_position(insert) {
            return self.spread_around(insert, count);
        }
        self.shifted_by_insertion(insert, count)
    }

    fn spread_around(&self, insert: &Position, count: usize) -> Vec<Range> {
        vec![
            Range::new(self.start.clone(), insert.clone()),
            Range::new(
                insert.transformed_by_insertion(insert, count, true),
                self.end.transformed_by_insertion(insert, count, true),
            ),
        ]
    }

    fn shifted_by_insertion(&self, insert: &Position, count: usize) -> Vec<Range> {
        let start = self.start.transformed_by_insertion(insert, count, true);
        let end = if self.is_collapsed() {
            start.clone()
        } else {
            self.end.transformed_by_insertion(insert, count, false)
        };
        vec![Range::new(start, end)]
    }
}

/// Joins ranges given in document order into a single span from the first
/// start to the last end.
///
/// Any gap between the pieces is covered too. Callers rely on that gap
/// collapsing once the content that caused it is transformed away.
pub fn join_ranges(ranges: Vec<Range>) -> Option<Range> {
    let mut iter = ranges.into_iter();
    let first = iter.next()?;
    match iter.last() {
        Some(last) => Some(Range::new(first.start, last.end)),
        None => Some(first),
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(path: &[usize]) -> Position {
        Position::new("main", path.to_vec())
    }

    fn flat(start: usize, end: usize) -> Range {
        Range::new(pos(&[start]), pos(&[end]))
    }

    #[test]
    fn from_position_and_shift() {
        let range = Range::from_position_and_shift(&pos(&[1, 2]), 3);
        assert_eq!(range, Range::new(pos(&[1, 2]), pos(&[1, 5])));
        assert!(range.is_flat());
        assert_eq!(range.width(), 3);
    }

    #[test]
    fn difference_without_overlap_keeps_range() {
        assert_eq!(flat(0, 2).difference(&flat(3, 5)), vec![flat(0, 2)]);
        assert_eq!(flat(0, 2).difference(&flat(2, 5)), vec![flat(0, 2)]);
    }

    #[test]
    fn difference_with_partial_overlap() {
        assert_eq!(flat(0, 4).difference(&flat(2, 6)), vec![flat(0, 2)]);
        assert_eq!(flat(2, 6).difference(&flat(0, 4)), vec![flat(4, 6)]);
    }

    #[test]
    fn difference_with_nested_range_splits() {
        assert_eq!(flat(0, 5).difference(&flat(2, 4)), vec![flat(0, 2), flat(4, 5)]);
    }

    #[test]
    fn difference_when_covered_is_empty() {
        assert!(flat(2, 4).difference(&flat(0, 5)).is_empty());
        assert!(flat(2, 4).difference(&flat(2, 4)).is_empty());
    }

    #[test]
    fn intersection_cases() {
        assert_eq!(flat(0, 5).intersection(&flat(2, 4)), Some(flat(2, 4)));
        assert_eq!(flat(0, 4).intersection(&flat(2, 6)), Some(flat(2, 4)));
        assert_eq!(flat(2, 4).intersection(&flat(0, 5)), Some(flat(2, 4)));
        assert_eq!(flat(0, 2).intersection(&flat(2, 4)), None);
    }

    #[test]
    fn intersection_with_deeper_range() {
        let outer = flat(0, 3);
        let inner = Range::new(pos(&[1, 0]), pos(&[1, 2]));
        assert_eq!(outer.intersection(&inner), Some(inner.clone()));
        assert!(outer.contains_range(&inner));
        assert_eq!(
            outer.difference(&inner),
            vec![Range::new(pos(&[0]), pos(&[1, 0])), Range::new(pos(&[1, 2]), pos(&[3]))]
        );
    }

    #[test]
    fn ranges_in_different_roots_never_intersect() {
        let other = Range::new(Position::new("other", vec![0]), Position::new("other", vec![9]));
        assert!(!flat(0, 5).is_intersecting(&other));
        assert_eq!(flat(0, 5).difference(&other), vec![flat(0, 5)]);
    }

    #[test]
    fn join_covers_gap() {
        assert_eq!(join_ranges(vec![flat(0, 2), flat(4, 5)]), Some(flat(0, 5)));
        assert_eq!(join_ranges(vec![flat(1, 3)]), Some(flat(1, 3)));
        assert_eq!(join_ranges(vec![]), None);
    }

    #[test]
    fn insertion_inside_spreads_range() {
        assert_eq!(flat(0, 5).transformed_by_insertion(&pos(&[2]), 3), vec![flat(0, 2), flat(5, 8)]);
    }

    #[test]
    fn insertion_at_boundaries_stays_outside() {
        assert_eq!(flat(2, 5).transformed_by_insertion(&pos(&[2]), 3), vec![flat(5, 8)]);
        assert_eq!(flat(2, 5).transformed_by_insertion(&pos(&[5]), 3), vec![flat(2, 5)]);
        assert_eq!(flat(2, 5).transformed_by_insertion(&pos(&[0]), 1), vec![flat(3, 6)]);
    }

    #[test]
    fn deep_insertion_inside_node_keeps_range() {
        assert_eq!(flat(0, 3).transformed_by_insertion(&pos(&[1, 4]), 2), vec![flat(0, 3)]);
    }

    #[test]
    fn spread_around_deep_insertion() {
        assert_eq!(
            flat(0, 3).spread_by_insertion(&pos(&[1, 4]), 2),
            vec![Range::new(pos(&[0]), pos(&[1, 4])), Range::new(pos(&[1, 6]), pos(&[3]))]
        );
        // Same-level and boundary insertions behave like a plain transform.
        assert_eq!(flat(0, 5).spread_by_insertion(&pos(&[2]), 3), vec![flat(0, 2), flat(5, 8)]);
        assert_eq!(flat(2, 5).spread_by_insertion(&pos(&[5]), 3), vec![flat(2, 5)]);
        assert_eq!(flat(0, 3).spread_by_insertion(&pos(&[4, 0]), 1), vec![flat(0, 3)]);
    }
}
