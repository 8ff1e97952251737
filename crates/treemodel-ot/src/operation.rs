//! Operation variants.
//!
//! The set is closed: insert, move (which also models removal, as a move to
//! the graveyard root), attribute change, and the no-op identity. Every
//! operation carries the document version it was computed against.

use serde_json::Value;

use crate::node::Node;
use crate::position::{Position, RootId};
use crate::range::Range;
use crate::validate::{validate_operation, ValidationError};

// ── Kind ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Move,
    Attribute,
    NoOp,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Move => "move",
            OperationKind::Attribute => "attribute",
            OperationKind::NoOp => "noop",
        }
    }
}

// ── Insert ────────────────────────────────────────────────────────────────

/// Inserts `nodes` at `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOperation {
    pub position: Position,
    pub nodes: Vec<Node>,
    pub base_version: u64,
}

impl InsertOperation {
    pub fn new(position: Position, nodes: Vec<Node>, base_version: u64) -> Self {
        Self {
            position,
            nodes,
            base_version,
        }
    }

    /// Number of inserted nodes, the only thing transforms need from the content.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Removal of the inserted nodes.
    pub fn reversed(&self) -> MoveOperation {
        MoveOperation::remove(self.position.clone(), self.node_count(), self.base_version + 1)
    }
}

// ── Move ──────────────────────────────────────────────────────────────────

/// Moves `how_many` nodes starting at `source` to `target`.
///
/// `target` is expressed in the document as it is before the nodes are
/// detached. See [`MoveOperation::moved_range_start`] for where they land.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOperation {
    pub source: Position,
    pub how_many: usize,
    pub target: Position,
    pub base_version: u64,
}

impl MoveOperation {
    pub fn new(source: Position, how_many: usize, target: Position, base_version: u64) -> Self {
        Self {
            source,
            how_many,
            target,
            base_version,
        }
    }

    /// Removal: a move to the start of the graveyard root.
    pub fn remove(source: Position, how_many: usize, base_version: u64) -> Self {
        Self::new(source, how_many, Position::new(RootId::graveyard(), vec![0]), base_version)
    }

    pub fn is_removal(&self) -> bool {
        self.target.root.is_graveyard()
    }

    pub fn source_range(&self) -> Range {
        Range::from_position_and_shift(&self.source, self.how_many)
    }

    /// Position of the first moved node once the move has been applied.
    pub fn moved_range_start(&self) -> Position {
        self.target
            .transformed_by_deletion(&self.source, self.how_many)
            .unwrap_or_else(|| self.target.clone())
    }

    /// Moves the nodes back to where they came from.
    pub fn reversed(&self) -> MoveOperation {
        let moved_start = self.moved_range_start();
        let target = self
            .source
            .transformed_by_insertion(&moved_start, self.how_many, true);
        MoveOperation::new(moved_start, self.how_many, target, self.base_version + 1)
    }
}

// ── Attribute ─────────────────────────────────────────────────────────────

/// Changes attribute `key` on every node in `range`.
///
/// `None` stands for an absent attribute: `old_value: None` adds the
/// attribute, `new_value: None` removes it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeOperation {
    pub range: Range,
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub base_version: u64,
}

impl AttributeOperation {
    pub fn new(
        range: Range,
        key: impl Into<String>,
        old_value: Option<Value>,
        new_value: Option<Value>,
        base_version: u64,
    ) -> Self {
        Self {
            range,
            key: key.into(),
            old_value,
            new_value,
            base_version,
        }
    }

    /// Two changes conflict when they touch the same key and disagree on the
    /// resulting value. Removing the same attribute twice is no conflict.
    pub fn conflicts_with(&self, other: &AttributeOperation) -> bool {
        self.key == other.key && self.new_value != other.new_value
    }

    pub fn reversed(&self) -> AttributeOperation {
        AttributeOperation::new(
            self.range.clone(),
            self.key.clone(),
            self.new_value.clone(),
            self.old_value.clone(),
            self.base_version + 1,
        )
    }
}

// ── NoOp ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoOperation {
    pub base_version: u64,
}

impl NoOperation {
    pub fn new(base_version: u64) -> Self {
        Self { base_version }
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Operation {
    Insert(InsertOperation),
    Move(MoveOperation),
    Attribute(AttributeOperation),
    NoOp(NoOperation),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert(_) => OperationKind::Insert,
            Operation::Move(_) => OperationKind::Move,
            Operation::Attribute(_) => OperationKind::Attribute,
            Operation::NoOp(_) => OperationKind::NoOp,
        }
    }

    pub fn base_version(&self) -> u64 {
        match self {
            Operation::Insert(op) => op.base_version,
            Operation::Move(op) => op.base_version,
            Operation::Attribute(op) => op.base_version,
            Operation::NoOp(op) => op.base_version,
        }
    }

    pub fn set_base_version(&mut self, version: u64) {
        match self {
            Operation::Insert(op) => op.base_version = version,
            Operation::Move(op) => op.base_version = version,
            Operation::Attribute(op) => op.base_version = version,
            Operation::NoOp(op) => op.base_version = version,
        }
    }

    pub fn with_base_version(mut self, version: u64) -> Self {
        self.set_base_version(version);
        self
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Operation::NoOp(_))
    }

    /// The operation that undoes this one, computed against the document
    /// this one produces.
    pub fn reversed(&self) -> Operation {
        match self {
            Operation::Insert(op) => Operation::Move(op.reversed()),
            Operation::Move(op) => Operation::Move(op.reversed()),
            Operation::Attribute(op) => Operation::Attribute(op.reversed()),
            Operation::NoOp(op) => Operation::NoOp(NoOperation::new(op.base_version + 1)),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_operation(self)
    }
}

impl From<InsertOperation> for Operation {
    fn from(op: InsertOperation) -> Self {
        Operation::Insert(op)
    }
}

impl From<MoveOperation> for Operation {
    fn from(op: MoveOperation) -> Self {
        Operation::Move(op)
    }
}

impl From<AttributeOperation> for Operation {
    fn from(op: AttributeOperation) -> Self {
        Operation::Attribute(op)
    }
}

impl From<NoOperation> for Operation {
    fn from(op: NoOperation) -> Self {
        Operation::NoOp(op)
    }
}
