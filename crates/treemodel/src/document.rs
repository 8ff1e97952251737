//! The tree operations are applied to.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

use treemodel_ot::codec::json::node_to_json;
use treemodel_ot::{
    AttributeOperation, InsertOperation, MoveOperation, Node, Operation, Position, Range, RootId,
};

use crate::error::DocumentError;

/// Options for [`Document::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Reject operations whose base version differs from the document
    /// version.
    pub check_version: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            check_version: true,
        }
    }
}

/// A set of named roots, each an ordered list of nodes, plus the version
/// counter advanced by every applied operation.
///
/// The graveyard root always exists; removed content ends up there.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    roots: IndexMap<RootId, Vec<Node>>,
    version: u64,
    options: ApplyOptions,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut roots = IndexMap::new();
        roots.insert(RootId::graveyard(), Vec::new());
        Self {
            roots,
            version: 0,
            options: ApplyOptions::default(),
        }
    }

    /// Adds (or replaces) a root holding `nodes`.
    pub fn with_root(mut self, name: impl Into<RootId>, nodes: Vec<Node>) -> Self {
        self.roots.insert(name.into(), nodes);
        self
    }

    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn options(&self) -> ApplyOptions {
        self.options
    }

    pub fn roots(&self) -> &IndexMap<RootId, Vec<Node>> {
        &self.roots
    }

    pub fn root(&self, name: &str) -> Option<&[Node]> {
        self.roots.get(&RootId::new(name)).map(Vec::as_slice)
    }

    /// The node right after `position`, if any.
    pub fn node_at(&self, position: &Position) -> Option<&Node> {
        let nodes = self.roots.get(&position.root)?;
        children(nodes, position.parent_path())?.get(position.offset())
    }

    /// Text content of a whole root.
    pub fn text(&self, name: &str) -> Option<String> {
        self.root(name)
            .map(|nodes| nodes.iter().map(Node::text_content).collect())
    }

    pub fn to_json(&self) -> Value {
        let roots: Map<String, Value> = self
            .roots
            .iter()
            .map(|(name, nodes)| {
                (
                    name.to_string(),
                    Value::Array(nodes.iter().map(node_to_json).collect()),
                )
            })
            .collect();
        json!({
            "version": self.version,
            "roots": roots,
        })
    }

    // ── Apply ─────────────────────────────────────────────────────────────

    /// Applies `op` and advances the version.
    ///
    /// On error the document is left unchanged. Attribute old values are not
    /// checked against the content.
    pub fn apply(&mut self, op: &Operation) -> Result<(), DocumentError> {
        if self.options.check_version && op.base_version() != self.version {
            debug!(
                expected = op.base_version(),
                actual = self.version,
                "rejecting operation with stale base version"
            );
            return Err(DocumentError::VersionMismatch {
                expected: op.base_version(),
                actual: self.version,
            });
        }
        op.validate()?;
        match op {
            Operation::Insert(op) => self.apply_insert(op)?,
            Operation::Move(op) => self.apply_move(op)?,
            Operation::Attribute(op) => self.apply_attribute(op)?,
            // NoOp only advances the version.
            _ => {}
        }
        self.version += 1;
        trace!(kind = op.kind().as_str(), version = self.version, "applied operation");
        Ok(())
    }

    /// Applies `ops` in order, stopping at the first failure. Operations
    /// before the failing one stay applied.
    pub fn apply_all(&mut self, ops: &[Operation]) -> Result<(), DocumentError> {
        ops.iter().try_for_each(|op| self.apply(op))
    }

    fn apply_insert(&mut self, op: &InsertOperation) -> Result<(), DocumentError> {
        self.check_slot(&op.position)?;
        let siblings = self.siblings_mut(&op.position)?;
        insert_nodes(siblings, op.position.offset(), op.nodes.iter().cloned());
        Ok(())
    }

    fn apply_move(&mut self, op: &MoveOperation) -> Result<(), DocumentError> {
        let start = op.source.offset();
        let len = self.siblings(&op.source)?.len();
        let end = match start.checked_add(op.how_many) {
            Some(end) if end <= len => end,
            _ => return Err(DocumentError::OffsetOutOfBounds(op.source.clone())),
        };
        self.check_slot(&op.target)?;

        let landing = op.moved_range_start();
        let at = landing.offset();
        let moved: Vec<Node> = self.siblings_mut(&op.source)?.drain(start..end).collect();
        let moved = match self.siblings_mut(&landing) {
            Ok(siblings) if at <= siblings.len() => {
                insert_nodes(siblings, at, moved);
                return Ok(());
            }
            _ => moved,
        };

        // Put the nodes back so the document is unchanged.
        if let Ok(siblings) = self.siblings_mut(&op.source) {
            insert_nodes(siblings, start, moved);
        }
        Err(DocumentError::InvalidPosition(landing))
    }

    fn apply_attribute(&mut self, op: &AttributeOperation) -> Result<(), DocumentError> {
        self.check_slot(&op.range.start)?;
        self.check_slot(&op.range.end)?;
        let nodes = self.root_mut(&op.range.start.root)?;
        set_attribute(nodes, &mut Vec::new(), &op.range, &op.key, op.new_value.as_ref());
        Ok(())
    }

    // ── Navigation ────────────────────────────────────────────────────────

    fn root_mut(&mut self, root: &RootId) -> Result<&mut Vec<Node>, DocumentError> {
        self.roots
            .get_mut(root)
            .ok_or_else(|| DocumentError::RootNotFound(root.clone()))
    }

    fn siblings(&self, position: &Position) -> Result<&[Node], DocumentError> {
        let nodes = self
            .roots
            .get(&position.root)
            .ok_or_else(|| DocumentError::RootNotFound(position.root.clone()))?;
        children(nodes, position.parent_path())
            .ok_or_else(|| DocumentError::InvalidPosition(position.clone()))
    }

    fn siblings_mut(&mut self, position: &Position) -> Result<&mut Vec<Node>, DocumentError> {
        let nodes = self.root_mut(&position.root)?;
        children_mut(nodes, position.parent_path())
            .ok_or_else(|| DocumentError::InvalidPosition(position.clone()))
    }

    /// Checks that `position` addresses an existing slot.
    fn check_slot(&self, position: &Position) -> Result<(), DocumentError> {
        if position.offset() > self.siblings(position)?.len() {
            return Err(DocumentError::OffsetOutOfBounds(position.clone()));
        }
        Ok(())
    }
}

fn children<'a>(nodes: &'a [Node], steps: &[usize]) -> Option<&'a [Node]> {
    steps
        .iter()
        .try_fold(nodes, |level, &i| level.get(i)?.children())
}

fn children_mut<'a>(nodes: &'a mut Vec<Node>, steps: &[usize]) -> Option<&'a mut Vec<Node>> {
    let mut level = nodes;
    for &i in steps {
        level = level.get_mut(i)?.children_mut()?;
    }
    Some(level)
}

fn insert_nodes(siblings: &mut Vec<Node>, at: usize, nodes: impl IntoIterator<Item = Node>) {
    let tail = siblings.split_off(at);
    siblings.extend(nodes);
    siblings.extend(tail);
}

/// Sets `key` on every node whose preceding position lies inside `range`,
/// at any depth. An element the range starts inside of is left alone; one
/// whose opening is covered changes even if the range ends inside it.
///
/// `path` is the path of `nodes`' parent and is restored on return.
fn set_attribute(
    nodes: &mut [Node],
    path: &mut Vec<usize>,
    range: &Range,
    key: &str,
    value: Option<&Value>,
) {
    for (i, node) in nodes.iter_mut().enumerate() {
        path.push(i);
        // Path order is document order; nothing from here on is covered.
        if path.as_slice() >= range.end.path.as_slice() {
            path.pop();
            return;
        }
        if path.as_slice() >= range.start.path.as_slice() {
            let attributes = node.attributes_mut();
            match value {
                Some(v) => {
                    attributes.insert(key.to_string(), v.clone());
                }
                None => {
                    attributes.shift_remove(key);
                }
            }
        }
        if let Some(children) = node.children_mut() {
            set_attribute(children, path, range, key, value);
        }
        path.pop();
    }
}
