//! treemodel — a reference tree document for `treemodel-ot` operations.
//!
//! [`Document`] holds named roots of [`Node`](treemodel_ot::Node)s and a
//! version counter. Applying the operations produced by
//! [`treemodel_ot::transform()`] in either order leads two documents to the
//! same state.

pub mod document;
pub mod error;

pub use document::{ApplyOptions, Document};
pub use error::DocumentError;
