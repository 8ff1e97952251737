//! treemodel-ot — operational transformation for a tree-structured document
//! model.
//!
//! Two participants edit the same document concurrently. Each edit is an
//! [`Operation`] computed against a document version. When an operation
//! arrives that was computed against an older version, it is rewritten with
//! [`transform()`] against every operation applied in the meantime, so that
//! all participants converge on the same document.
//!
//! ```
//! use treemodel_ot::{transform, InsertOperation, Node, Operation, Position};
//!
//! let a: Operation = InsertOperation::new(Position::new("main", vec![2]), Node::text("xy"), 0).into();
//! let b: Operation = InsertOperation::new(Position::new("main", vec![1]), Node::text("z"), 0).into();
//!
//! let a_after_b = transform(&a, &b, true);
//! match &a_after_b[0] {
//!     Operation::Insert(op) => assert_eq!(op.position, Position::new("main", vec![3])),
//!     _ => unreachable!(),
//! }
//! assert_eq!(a_after_b[0].base_version(), 1);
//! ```
//!
//! # Modules
//!
//! - [`position`], [`range`]: addressing slots and spans of the tree.
//! - [`node`]: content carried by inserts.
//! - [`operation`]: the closed operation set.
//! - [`transform`](mod@transform): the pairwise dispatch.
//! - [`version`], [`rebase`](mod@rebase): version stamping and sequence transformation.
//! - [`validate`]: construction-time checks.
//! - [`codec`]: JSON wire format.

pub mod codec;
pub mod node;
pub mod operation;
pub mod position;
pub mod range;
pub mod rebase;
pub mod transform;
pub mod validate;
pub mod version;

pub use codec::CodecError;
pub use node::{Attributes, Node};
pub use operation::{
    AttributeOperation, InsertOperation, MoveOperation, NoOperation, Operation, OperationKind,
};
pub use position::{compare_paths, PathRelation, Position, PositionRelation, RootId, GRAVEYARD};
pub use range::{join_ranges, Range};
pub use rebase::{rebase, transform_sequences};
pub use transform::transform;
pub use validate::{validate_operation, validate_position, validate_range, ValidationError};
pub use version::sequence_versions;
