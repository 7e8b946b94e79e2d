#![allow(dead_code)]

use edgewise::store::{Function, Mutation, QueryResponse, Selection};
use edgewise::{
    Dataful, Fields, GraphStore, Identifiable, Mapper, Node, StoreError, Typed,
};
use edgewise::store::SledGraphStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Fields)]
pub struct Sub {
    #[edge("f4")]
    pub hihi: String,
}

#[derive(Debug, Clone, Default, PartialEq, Fields)]
pub struct Tnode {
    #[edge("f1")]
    pub field1: String,
    #[edge("sub,inline,prefix")]
    pub sub: Sub,
    pub count: i64,
    pub flag: bool,
    pub tags: Vec<String>,
    #[edge("extra,omitempty")]
    pub extra: Option<String>,
    #[edge("-")]
    pub scratch: String,
    pub meta: HashMap<String, String>,

    identity: String,
}

impl Tnode {
    pub fn new(identity: &str, field1: &str) -> Self {
        Self {
            field1: field1.to_string(),
            sub: Sub {
                hihi: "hi!".to_string(),
            },
            identity: identity.to_string(),
            ..Self::default()
        }
    }
}

impl Identifiable for Tnode {
    fn identity(&self) -> String {
        self.identity.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Fields)]
pub struct Payload {
    #[serde(rename = "label")]
    pub name: String,
    pub weight: i64,
}

/// Record holding another record without inlining it
#[derive(Debug, Clone, Default, Serialize, Fields)]
pub struct Labelled {
    pub id: String,
    pub payload: Payload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Identifiable for Labelled {
    fn identity(&self) -> String {
        self.id.clone()
    }
}

/// Record whose payload and type tag are supplied separately
#[derive(Fields)]
pub struct Envelope {
    id: String,
    tag: String,
    payload: Payload,
}

impl Envelope {
    pub fn new(id: &str, tag: &str, payload: Payload) -> Self {
        Self {
            id: id.to_string(),
            tag: tag.to_string(),
            payload,
        }
    }
}

impl Identifiable for Envelope {
    fn identity(&self) -> String {
        self.id.clone()
    }

    fn typed(&self) -> Option<&dyn Typed> {
        Some(self)
    }

    fn dataful(&self) -> Option<&dyn Dataful> {
        Some(self)
    }
}

impl Typed for Envelope {
    fn type_tag(&self) -> String {
        self.tag.clone()
    }
}

impl Dataful for Envelope {
    fn data(&self) -> &dyn Fields {
        &self.payload
    }
}

#[derive(Fields)]
#[allow(dead_code)]
pub enum Shape {
    Circle,
    Square,
}

/// Record whose payload has no named fields
#[derive(Fields)]
pub struct Shaped {
    shape: Shape,
}

impl Shaped {
    pub fn circle() -> Self {
        Self {
            shape: Shape::Circle,
        }
    }
}

impl Identifiable for Shaped {
    fn identity(&self) -> String {
        "shaped".to_string()
    }

    fn dataful(&self) -> Option<&dyn Dataful> {
        Some(self)
    }
}

impl Dataful for Shaped {
    fn data(&self) -> &dyn Fields {
        &self.shape
    }
}

/// Store wrapper counting round trips
pub struct CountingStore {
    inner: SledGraphStore,
    queries: AtomicUsize,
    executions: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: SledGraphStore::temporary().unwrap(),
            queries: AtomicUsize::new(0),
            executions: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl GraphStore for CountingStore {
    fn blank_node(&self, identity_hint: &str) -> Result<Node, StoreError> {
        self.inner.blank_node(identity_hint)
    }

    fn execute(&self, mutation: Mutation) -> Result<(), StoreError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(mutation)
    }

    fn query(
        &self,
        function: &Function,
        selections: &[Selection],
    ) -> Result<QueryResponse, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(function, selections)
    }

    fn declare_index(&self, predicate: &str) -> Result<(), StoreError> {
        self.inner.declare_index(predicate)
    }
}

pub fn counting_mapper() -> (Arc<CountingStore>, Mapper) {
    let store = Arc::new(CountingStore::new());
    let mapper = Mapper::new(store.clone());
    mapper.bootstrap_schema().unwrap();
    (store, mapper)
}

pub fn mapper() -> Mapper {
    let mapper = Mapper::new(Arc::new(SledGraphStore::temporary().unwrap()));
    mapper.bootstrap_schema().unwrap();
    mapper
}
