//! Graph Store
//!
//! The collaborator the mapper writes through. Nodes are allocated blank,
//! edges are staged into a [`Mutation`] and the batch is executed atomically.
//! Reads are exact-match queries over indexed predicates.

pub mod persistence;

use crate::error::StoreError;
use crate::types::{Uid, UID_PREDICATE};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use persistence::SledGraphStore;

/// Scalar carried by an edge or returned by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    /// Opaque payload for values with no native scalar mapping
    Bytes(Vec<u8>),
    /// Reference to another node, only produced by queries
    Uid(Uid),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uid(&self) -> Option<Uid> {
        match self {
            Value::Uid(uid) => Some(*uid),
            _ => None,
        }
    }
}

/// Handle to one vertex in the store.
///
/// The zero value is the "not found" sentinel returned by lookups that match
/// nothing; it displays as an empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Node {
    uid: Uid,
}

impl Node {
    pub fn from_uid(uid: Uid) -> Self {
        Self { uid }
    }

    /// The not-found sentinel
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn is_empty(&self) -> bool {
        self.uid == 0
    }

    /// Blank edge from this node under `predicate`
    pub fn edge(&self, predicate: &str) -> Edge {
        Edge {
            subject: self.uid,
            predicate: predicate.to_string(),
            object: None,
        }
    }

    /// Relation edge from this node to `target`
    pub fn connect_to(&self, predicate: &str, target: &Node) -> Result<Edge, StoreError> {
        let mut edge = self.edge(predicate);
        edge.connect_to(target)?;
        Ok(edge)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "{:#x}", self.uid)
    }
}

/// What an edge points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeObject {
    Value(Value),
    Node(Uid),
}

/// A named scalar or relation hanging off a node.
///
/// An edge holds either a scalar or a node reference, never both; setting a
/// scalar again replaces the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    subject: Uid,
    predicate: String,
    object: Option<EdgeObject>,
}

impl Edge {
    pub fn subject(&self) -> Node {
        Node::from_uid(self.subject)
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn object(&self) -> Option<&EdgeObject> {
        self.object.as_ref()
    }

    pub fn set_string(&mut self, value: impl Into<String>) -> Result<(), StoreError> {
        self.set_value(Value::Str(value.into()))
    }

    pub fn set_bool(&mut self, value: bool) -> Result<(), StoreError> {
        self.set_value(Value::Bool(value))
    }

    pub fn set_int(&mut self, value: i64) -> Result<(), StoreError> {
        self.set_value(Value::Int(value))
    }

    pub fn set_bytes(&mut self, value: Vec<u8>) -> Result<(), StoreError> {
        self.set_value(Value::Bytes(value))
    }

    fn set_value(&mut self, value: Value) -> Result<(), StoreError> {
        if let Some(EdgeObject::Node(_)) = self.object {
            return Err(StoreError::Connected(self.predicate.clone()));
        }
        if let Value::Uid(_) = value {
            return Err(StoreError::UidValue(self.predicate.clone()));
        }
        self.object = Some(EdgeObject::Value(value));
        Ok(())
    }

    pub fn connect_to(&mut self, target: &Node) -> Result<(), StoreError> {
        if let Some(EdgeObject::Value(_)) = self.object {
            return Err(StoreError::Valued(self.predicate.clone()));
        }
        if target.is_empty() {
            return Err(StoreError::EmptyTarget(self.predicate.clone()));
        }
        self.object = Some(EdgeObject::Node(target.uid()));
        Ok(())
    }
}

/// A batch of staged edges, applied by [`GraphStore::execute`] as one unit
#[derive(Debug, Clone, Default)]
pub struct Mutation {
    edges: Vec<Edge>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an edge. Edges without a value or target are rejected.
    pub fn set(&mut self, edge: Edge) -> Result<(), StoreError> {
        if edge.object.is_none() {
            return Err(StoreError::UnsetEdge(edge.predicate));
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Root function of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    /// Exact match of a string predicate against its stored term
    Eq { predicate: String, value: String },
}

impl Function {
    pub fn eq(predicate: &str, value: &str) -> Self {
        Function::Eq {
            predicate: predicate.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Eq { predicate, value } => {
                write!(f, "eq({}, \"{}\")", predicate, value)
            }
        }
    }
}

/// Predicate requested from each matched node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Predicate(String),
    /// Follow a relation one hop and read `fields` on every target
    Relation { predicate: String, fields: Vec<String> },
}

impl Selection {
    pub fn predicate(name: impl Into<String>) -> Self {
        Selection::Predicate(name.into())
    }

    pub fn uid() -> Self {
        Selection::Predicate(UID_PREDICATE.to_string())
    }

    pub fn relation<I, S>(predicate: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Relation {
            predicate: predicate.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&str> for Selection {
    fn from(name: &str) -> Self {
        Selection::predicate(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Value,
}

/// One node in a query result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryNode {
    /// Predicate this node was reached through, empty at the root
    pub attribute: String,
    pub uid: Uid,
    pub properties: Vec<Property>,
    pub children: Vec<QueryNode>,
}

impl QueryNode {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Targets reached through the relation `attribute`
    pub fn children_of<'a>(&'a self, attribute: &'a str) -> impl Iterator<Item = &'a QueryNode> {
        self.children.iter().filter(move |c| c.attribute == attribute)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    pub nodes: Vec<QueryNode>,
}

/// Graph store interface consumed by the mapper
pub trait GraphStore: Send + Sync {
    /// Allocate a new, edgeless node. The hint only labels the allocation.
    fn blank_node(&self, identity_hint: &str) -> Result<Node, StoreError>;

    /// Apply every staged edge of `mutation` atomically
    fn execute(&self, mutation: Mutation) -> Result<(), StoreError>;

    /// Nodes matching `function`, most recently allocated first
    fn query(
        &self,
        function: &Function,
        selections: &[Selection],
    ) -> Result<QueryResponse, StoreError>;

    /// Declare an exact-match index on a string predicate. Idempotent.
    fn declare_index(&self, predicate: &str) -> Result<(), StoreError>;
}
