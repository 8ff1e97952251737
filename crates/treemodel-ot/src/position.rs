//! Positions in the document tree.
//!
//! A [`Position`] addresses a slot between nodes: the root it lives in plus
//! the path of offsets leading to it. The last path step is the offset of the
//! slot inside its parent; every step before it selects a child node.
//!
//! Positions are plain values. Every transformation below returns a fresh
//! `Position` and leaves `self` untouched.

use std::fmt;

/// Name of the root that receives removed content.
pub const GRAVEYARD: &str = "$graveyard";

// ── RootId ────────────────────────────────────────────────────────────────

/// Opaque identifier of a tree root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(String);

impl RootId {
    pub fn new(name: impl Into<String>) -> Self {
        RootId(name.into())
    }

    /// The root removed nodes are moved to.
    pub fn graveyard() -> Self {
        RootId(GRAVEYARD.to_string())
    }

    pub fn is_graveyard(&self) -> bool {
        self.0 == GRAVEYARD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RootId {
    fn from(name: &str) -> Self {
        RootId::new(name)
    }
}

impl From<String> for RootId {
    fn from(name: String) -> Self {
        RootId(name)
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Path comparison ───────────────────────────────────────────────────────

/// How two offset paths relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRelation {
    /// Both paths are identical.
    Same,
    /// The first path is a strict prefix of the second one.
    Prefix,
    /// The second path is a strict prefix of the first one.
    Extension,
    /// The paths differ first at the given index.
    Differs(usize),
}

/// Compares two offset paths step by step.
pub fn compare_paths(a: &[usize], b: &[usize]) -> PathRelation {
    if let Some(i) = a.iter().zip(b).position(|(x, y)| x != y) {
        return PathRelation::Differs(i);
    }
    match a.len().cmp(&b.len()) {
        std::cmp::Ordering::Equal => PathRelation::Same,
        std::cmp::Ordering::Less => PathRelation::Prefix,
        std::cmp::Ordering::Greater => PathRelation::Extension,
    }
}

/// Document-order relation between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionRelation {
    Before,
    Same,
    After,
    /// The positions live in different roots and cannot be ordered.
    Different,
}

// ── Position ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub root: RootId,
    pub path: Vec<usize>,
}

impl Position {
    pub fn new(root: impl Into<RootId>, path: impl Into<Vec<usize>>) -> Self {
        Self {
            root: root.into(),
            path: path.into(),
        }
    }

    /// Offset of the addressed slot inside its parent.
    pub fn offset(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    /// Path of the parent node (every step but the last).
    pub fn parent_path(&self) -> &[usize] {
        match self.path.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    /// The same slot parent with a different offset.
    pub fn with_offset(&self, offset: usize) -> Position {
        let mut moved = self.clone();
        match moved.path.last_mut() {
            Some(last) => *last = offset,
            None => moved.path.push(offset),
        }
        moved
    }

    /// Whether both positions share the same parent node.
    pub fn has_same_parent_as(&self, other: &Position) -> bool {
        self.root == other.root && self.parent_path() == other.parent_path()
    }

    pub fn compare(&self, other: &Position) -> PositionRelation {
        if self.root != other.root {
            return PositionRelation::Different;
        }
        match compare_paths(&self.path, &other.path) {
            PathRelation::Same => PositionRelation::Same,
            PathRelation::Prefix => PositionRelation::Before,
            PathRelation::Extension => PositionRelation::After,
            PathRelation::Differs(i) => {
                if self.path[i] < other.path[i] {
                    PositionRelation::Before
                } else {
                    PositionRelation::After
                }
            }
        }
    }

    pub fn is_before(&self, other: &Position) -> bool {
        self.compare(other) == PositionRelation::Before
    }

    pub fn is_after(&self, other: &Position) -> bool {
        self.compare(other) == PositionRelation::After
    }

    /// Returns true if this position is inside one of the `count` nodes that
    /// start at `start` (i.e. it descends into them, not merely sits between
    /// them).
    pub fn is_inside_nodes(&self, start: &Position, count: usize) -> bool {
        if self.root != start.root {
            return false;
        }
        if compare_paths(start.parent_path(), self.parent_path()) != PathRelation::Prefix {
            return false;
        }
        let step = self.path[start.parent_path().len()];
        step >= start.offset() && step < start.offset().saturating_add(count)
    }

    /// Position after `count` nodes were inserted at `insert`.
    ///
    /// `insert_before` resolves the tie when both positions are equal: when
    /// set, the new nodes end up before this position and it gets shifted.
    pub fn transformed_by_insertion(
        &self,
        insert: &Position,
        count: usize,
        insert_before: bool,
    ) -> Position {
        let mut transformed = self.clone();
        if self.root != insert.root {
            return transformed;
        }
        match compare_paths(insert.parent_path(), self.parent_path()) {
            PathRelation::Same => {
                if insert.offset() < self.offset()
                    || (insert.offset() == self.offset() && insert_before)
                {
                    if let Some(last) = transformed.path.last_mut() {
                        *last += count;
                    }
                }
            }
            PathRelation::Prefix => {
                // Nodes were inserted into an ancestor of this position.
                let i = insert.parent_path().len();
                if insert.offset() <= self.path[i] {
                    transformed.path[i] += count;
                }
            }
            _ => {}
        }
        transformed
    }

    /// Position after `count` nodes starting at `delete` were removed.
    ///
    /// Returns `None` when the position was inside the removed content:
    /// strictly between two removed nodes, or inside one of them.
    pub fn transformed_by_deletion(&self, delete: &Position, count: usize) -> Option<Position> {
        let mut transformed = self.clone();
        if self.root != delete.root {
            return Some(transformed);
        }
        match compare_paths(delete.parent_path(), self.parent_path()) {
            PathRelation::Same => {
                if delete.offset() < self.offset() {
                    if delete.offset().saturating_add(count) > self.offset() {
                        return None;
                    }
                    if let Some(last) = transformed.path.last_mut() {
                        *last -= count;
                    }
                }
            }
            PathRelation::Prefix => {
                let i = delete.parent_path().len();
                if delete.offset() <= self.path[i] {
                    if delete.offset().saturating_add(count) > self.path[i] {
                        return None;
                    }
                    transformed.path[i] -= count;
                }
            }
            _ => {}
        }
        Some(transformed)
    }

    /// Location of this position after the content around it was relocated
    /// from `source` to `target`.
    ///
    /// The position must lie inside the relocated range: the head of the
    /// result is `target`, shifted by how far this position sat from
    /// `source`, and the rest of this position's path is appended unchanged.
    pub fn combined(&self, source: &Position, target: &Position) -> Position {
        let i = source.parent_path().len();
        let step = self.path.get(i).copied().unwrap_or_else(|| source.offset());
        let mut combined = target.with_offset(target.offset() + step.saturating_sub(source.offset()));
        if let Some(rest) = self.path.get(i + 1..) {
            combined.path.extend_from_slice(rest);
        }
        combined
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:[", self.root)?;
        for (i, step) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{step}")?;
        }
        f.write_str("]")
    }
}
