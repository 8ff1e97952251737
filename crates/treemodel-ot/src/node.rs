//! Content carried by insert operations.
//!
//! The transform layer never looks inside nodes; it only needs to know how
//! many there are. The structure is here so operations can be applied and
//! serialized by the layers around the engine.

use indexmap::IndexMap;
use serde_json::Value;

/// Attribute map of a node, in insertion order.
pub type Attributes = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A single character of text.
    Character { ch: char, attributes: Attributes },
    /// A container node with children.
    Element {
        name: String,
        attributes: Attributes,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn character(ch: char) -> Self {
        Node::Character {
            ch,
            attributes: Attributes::new(),
        }
    }

    /// One character node per `char` of `text`.
    pub fn text(text: &str) -> Vec<Node> {
        text.chars().map(Node::character).collect()
    }

    pub fn element(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element {
            name: name.into(),
            attributes: Attributes::new(),
            children,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes_mut().insert(key.into(), value);
        self
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Node::Character { attributes, .. } | Node::Element { attributes, .. } => attributes,
        }
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        match self {
            Node::Character { attributes, .. } | Node::Element { attributes, .. } => attributes,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes().get(key)
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Element { children, .. } => Some(children.as_slice()),
            Node::Character { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element { children, .. } => Some(children),
            Node::Character { .. } => None,
        }
    }

    /// Concatenated characters of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Character { ch, .. } => ch.to_string(),
            Node::Element { children, .. } => children.iter().map(Node::text_content).collect(),
        }
    }
}
