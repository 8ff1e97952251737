//! JSON codec for operations.
//!
//! ```json
//! {"type": "insert", "baseVersion": 3,
//!  "position": {"root": "main", "path": [0, 2]},
//!  "nodes": [{"character": "a"}, {"name": "p", "children": []}]}
//! {"type": "move", "baseVersion": 4,
//!  "sourcePosition": {...}, "howMany": 2, "targetPosition": {...}}
//! {"type": "attribute", "baseVersion": 5,
//!  "range": {"start": {...}, "end": {...}},
//!  "key": "bold", "oldValue": true, "newValue": false}
//! {"type": "noop", "baseVersion": 6}
//! ```
//!
//! Absent `oldValue` / `newValue` keys mean the attribute is absent. Empty
//! node attribute maps are omitted.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::node::{Attributes, Node};
use crate::operation::{
    AttributeOperation, InsertOperation, MoveOperation, NoOperation, Operation,
};
use crate::position::Position;
use crate::range::Range;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("{0} must be an object")]
    NotAnObject(&'static str),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid field `{0}`")]
    InvalidField(&'static str),
    #[error("unknown operation type `{0}`")]
    UnknownType(String),
}

// ── Serialization ─────────────────────────────────────────────────────────

pub fn position_to_json(position: &Position) -> Value {
    json!({
        "root": position.root.as_str(),
        "path": position.path,
    })
}

pub fn range_to_json(range: &Range) -> Value {
    json!({
        "start": position_to_json(&range.start),
        "end": position_to_json(&range.end),
    })
}

fn attributes_to_json(attributes: &Attributes) -> Value {
    Value::Object(
        attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

pub fn node_to_json(node: &Node) -> Value {
    let mut m = Map::new();
    match node {
        Node::Character { ch, .. } => {
            m.insert("character".into(), json!(ch.to_string()));
        }
        Node::Element { name, children, .. } => {
            m.insert("name".into(), json!(name));
            m.insert(
                "children".into(),
                Value::Array(children.iter().map(node_to_json).collect()),
            );
        }
    }
    if !node.attributes().is_empty() {
        m.insert("attributes".into(), attributes_to_json(node.attributes()));
    }
    Value::Object(m)
}

/// Serialize an operation to a `serde_json::Value`.
pub fn to_json(op: &Operation) -> Value {
    match op {
        Operation::Insert(op) => json!({
            "type": "insert",
            "baseVersion": op.base_version,
            "position": position_to_json(&op.position),
            "nodes": op.nodes.iter().map(node_to_json).collect::<Vec<_>>(),
        }),
        Operation::Move(op) => json!({
            "type": "move",
            "baseVersion": op.base_version,
            "sourcePosition": position_to_json(&op.source),
            "howMany": op.how_many,
            "targetPosition": position_to_json(&op.target),
        }),
        Operation::Attribute(op) => {
            let mut m = Map::new();
            m.insert("type".into(), json!("attribute"));
            m.insert("baseVersion".into(), json!(op.base_version));
            m.insert("range".into(), range_to_json(&op.range));
            m.insert("key".into(), json!(op.key));
            if let Some(old) = &op.old_value {
                m.insert("oldValue".into(), old.clone());
            }
            if let Some(new) = &op.new_value {
                m.insert("newValue".into(), new.clone());
            }
            Value::Object(m)
        }
        Operation::NoOp(op) => json!({
            "type": "noop",
            "baseVersion": op.base_version,
        }),
    }
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_batch(ops: &[Operation]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

fn object<'a>(v: &'a Value, what: &'static str) -> Result<&'a Map<String, Value>, CodecError> {
    v.as_object().ok_or(CodecError::NotAnObject(what))
}

fn field<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a Value, CodecError> {
    obj.get(key).ok_or(CodecError::MissingField(key))
}

fn u64_field(obj: &Map<String, Value>, key: &'static str) -> Result<u64, CodecError> {
    field(obj, key)?
        .as_u64()
        .ok_or(CodecError::InvalidField(key))
}

fn usize_field(obj: &Map<String, Value>, key: &'static str) -> Result<usize, CodecError> {
    usize::try_from(u64_field(obj, key)?).map_err(|_| CodecError::InvalidField(key))
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, CodecError> {
    field(obj, key)?
        .as_str()
        .ok_or(CodecError::InvalidField(key))
}

pub fn position_from_json(v: &Value) -> Result<Position, CodecError> {
    let obj = object(v, "position")?;
    let root = str_field(obj, "root")?;
    let path = field(obj, "path")?
        .as_array()
        .ok_or(CodecError::InvalidField("path"))?
        .iter()
        .map(|step| {
            step.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or(CodecError::InvalidField("path"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Position::new(root, path))
}

pub fn range_from_json(v: &Value) -> Result<Range, CodecError> {
    let obj = object(v, "range")?;
    Ok(Range::new(
        position_from_json(field(obj, "start")?)?,
        position_from_json(field(obj, "end")?)?,
    ))
}

fn attributes_from_json(obj: &Map<String, Value>) -> Result<Attributes, CodecError> {
    match obj.get("attributes") {
        None => Ok(Attributes::new()),
        Some(v) => Ok(object(v, "attributes")?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()),
    }
}

pub fn node_from_json(v: &Value) -> Result<Node, CodecError> {
    let obj = object(v, "node")?;
    let attributes = attributes_from_json(obj)?;
    if let Some(ch) = obj.get("character") {
        let mut chars = ch
            .as_str()
            .ok_or(CodecError::InvalidField("character"))?
            .chars();
        return match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(Node::Character { ch, attributes }),
            _ => Err(CodecError::InvalidField("character")),
        };
    }
    let name = str_field(obj, "name")?.to_string();
    let children = match obj.get("children") {
        None => Vec::new(),
        Some(v) => decode_nodes(v, "children")?,
    };
    Ok(Node::Element {
        name,
        attributes,
        children,
    })
}

fn decode_nodes(v: &Value, key: &'static str) -> Result<Vec<Node>, CodecError> {
    v.as_array()
        .ok_or(CodecError::InvalidField(key))?
        .iter()
        .map(node_from_json)
        .collect()
}

/// Deserialize an operation from a `serde_json::Value`.
///
/// Only the shape is checked here; see [`crate::validate`] for semantic
/// checks.
pub fn from_json(v: &Value) -> Result<Operation, CodecError> {
    let obj = object(v, "operation")?;
    let base_version = u64_field(obj, "baseVersion")?;
    match str_field(obj, "type")? {
        "insert" => Ok(InsertOperation::new(
            position_from_json(field(obj, "position")?)?,
            decode_nodes(field(obj, "nodes")?, "nodes")?,
            base_version,
        )
        .into()),
        "move" => Ok(MoveOperation::new(
            position_from_json(field(obj, "sourcePosition")?)?,
            usize_field(obj, "howMany")?,
            position_from_json(field(obj, "targetPosition")?)?,
            base_version,
        )
        .into()),
        "attribute" => Ok(AttributeOperation::new(
            range_from_json(field(obj, "range")?)?,
            str_field(obj, "key")?,
            obj.get("oldValue").cloned(),
            obj.get("newValue").cloned(),
            base_version,
        )
        .into()),
        "noop" => Ok(NoOperation::new(base_version).into()),
        other => Err(CodecError::UnknownType(other.to_string())),
    }
}

/// Deserialize a JSON array into a list of operations.
pub fn from_json_batch(v: &Value) -> Result<Vec<Operation>, CodecError> {
    v.as_array()
        .ok_or(CodecError::NotAnObject("batch"))?
        .iter()
        .map(from_json)
        .collect()
}
