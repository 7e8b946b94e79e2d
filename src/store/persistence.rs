//! Sled-backed graph store
//!
//! Three trees back the graph:
//! - `edges`: `uid ++ predicate` -> bincode [`StoredEdge`]
//! - `index`: `predicate ++ 0x00 ++ len(term) ++ term ++ uid` -> empty
//! - `schema`: `predicate` -> index kind
//!
//! Scalar predicates are single valued; relation predicates accumulate a
//! list of target uids. Only string scalars of declared predicates are
//! indexed.

use crate::error::StoreError;
use crate::store::{
    EdgeObject, Function, GraphStore, Mutation, Node, Property, QueryNode, QueryResponse,
    Selection, Value,
};
use crate::types::{Uid, UID_PREDICATE};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::Transactional;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

const EXACT_INDEX: &[u8] = b"exact";

/// Persisted form of one predicate on one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum StoredEdge {
    Scalar(Value),
    Relations(Vec<Uid>),
}

pub struct SledGraphStore {
    db: sled::Db,
    edges: sled::Tree,
    index: sled::Tree,
    schema: sled::Tree,
}

impl SledGraphStore {
    /// Open (or create) a store at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_db(sled::open(path)?)
    }

    /// Store that lives only as long as the handle
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            edges: db.open_tree("edges")?,
            index: db.open_tree("index")?,
            schema: db.open_tree("schema")?,
            db,
        })
    }

    pub fn is_indexed(&self, predicate: &str) -> Result<bool, StoreError> {
        Ok(self.schema.contains_key(predicate.as_bytes())?)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    fn indexed_predicates(&self) -> Result<HashSet<String>, StoreError> {
        let mut predicates = HashSet::new();
        for entry in self.schema.iter() {
            let (key, _) = entry?;
            predicates.insert(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(predicates)
    }

    fn load_edge(&self, uid: Uid, predicate: &str) -> Result<Option<StoredEdge>, StoreError> {
        match self.edges.get(edge_key(uid, predicate))? {
            Some(raw) => Ok(Some(bincode::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    fn materialize(
        &self,
        uid: Uid,
        attribute: &str,
        selections: &[Selection],
    ) -> Result<QueryNode, StoreError> {
        let mut node = QueryNode {
            attribute: attribute.to_string(),
            uid,
            ..QueryNode::default()
        };

        for selection in selections {
            match selection {
                Selection::Predicate(name) if name == UID_PREDICATE => {
                    node.properties.push(Property {
                        name: name.clone(),
                        value: Value::Uid(uid),
                    });
                }
                Selection::Predicate(name) => match self.load_edge(uid, name)? {
                    Some(StoredEdge::Scalar(value)) => node.properties.push(Property {
                        name: name.clone(),
                        value,
                    }),
                    Some(StoredEdge::Relations(targets)) => {
                        for target in targets {
                            node.children.push(QueryNode {
                                attribute: name.clone(),
                                uid: target,
                                ..QueryNode::default()
                            });
                        }
                    }
                    None => {}
                },
                Selection::Relation { predicate, fields } => {
                    if let Some(StoredEdge::Relations(targets)) = self.load_edge(uid, predicate)? {
                        let nested: Vec<Selection> =
                            fields.iter().map(|f| Selection::predicate(f.as_str())).collect();
                        for target in targets {
                            node.children
                                .push(self.materialize(target, predicate, &nested)?);
                        }
                    }
                }
            }
        }

        Ok(node)
    }
}

impl GraphStore for SledGraphStore {
    fn blank_node(&self, identity_hint: &str) -> Result<Node, StoreError> {
        // generate_id starts at zero, which is the empty-node sentinel
        let uid = self.db.generate_id()? + 1;
        debug!(hint = identity_hint, uid, "allocated blank node");
        Ok(Node::from_uid(uid))
    }

    fn execute(&self, mutation: Mutation) -> Result<(), StoreError> {
        if mutation.is_empty() {
            return Ok(());
        }
        let indexed = self.indexed_predicates()?;

        let result = (&self.edges, &self.index).transaction(
            |(edges, index)| -> Result<(), ConflictableTransactionError<StoreError>> {
                for edge in mutation.edges() {
                    let subject = edge.subject().uid();
                    let predicate = edge.predicate();
                    let key = edge_key(subject, predicate);

                    match edge.object() {
                        Some(EdgeObject::Value(value)) => {
                            if indexed.contains(predicate) {
                                if let Some(StoredEdge::Scalar(old)) = read_stored(edges, &key)? {
                                    if let Some(old_key) = index_key(predicate, &old, subject) {
                                        index.remove(old_key)?;
                                    }
                                }
                                if let Some(new_key) = index_key(predicate, value, subject) {
                                    index.insert(new_key, Vec::<u8>::new())?;
                                }
                            }
                            write_stored(edges, key, &StoredEdge::Scalar(value.clone()))?;
                        }
                        Some(EdgeObject::Node(target)) => {
                            let mut targets = match read_stored(edges, &key)? {
                                Some(StoredEdge::Relations(targets)) => targets,
                                Some(StoredEdge::Scalar(old)) => {
                                    // The relation replaces the scalar, so its term goes too
                                    if indexed.contains(predicate) {
                                        if let Some(old_key) = index_key(predicate, &old, subject)
                                        {
                                            index.remove(old_key)?;
                                        }
                                    }
                                    Vec::new()
                                }
                                None => Vec::new(),
                            };
                            if !targets.contains(target) {
                                targets.push(*target);
                            }
                            write_stored(edges, key, &StoredEdge::Relations(targets))?;
                        }
                        None => {
                            return Err(ConflictableTransactionError::Abort(StoreError::UnsetEdge(
                                predicate.to_string(),
                            )))
                        }
                    }
                }
                Ok(())
            },
        );

        result.map_err(|e| match e {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => StoreError::Sled(e),
        })?;

        debug!(edges = mutation.len(), "mutation applied");
        Ok(())
    }

    fn query(
        &self,
        function: &Function,
        selections: &[Selection],
    ) -> Result<QueryResponse, StoreError> {
        let Function::Eq { predicate, value } = function;
        if !self.is_indexed(predicate)? {
            return Err(StoreError::NotIndexed(predicate.clone()));
        }

        // Uids grow with allocation, so the reversed scan yields the newest match first
        let mut response = QueryResponse::default();
        for entry in self
            .index
            .scan_prefix(index_prefix(predicate, value.as_bytes()))
            .rev()
        {
            let (key, _) = entry?;
            let uid = uid_suffix(&key)?;
            response.nodes.push(self.materialize(uid, "", selections)?);
        }

        debug!(function = %function, matched = response.nodes.len(), "query");
        Ok(response)
    }

    fn declare_index(&self, predicate: &str) -> Result<(), StoreError> {
        if self.is_indexed(predicate)? {
            return Ok(());
        }

        // Backfill terms for values written before the index existed
        let mut backfilled = 0usize;
        for entry in self.edges.iter() {
            let (key, raw) = entry?;
            if key.len() <= 8 || &key[8..] != predicate.as_bytes() {
                continue;
            }
            let uid = uid_prefix(&key)?;
            if let StoredEdge::Scalar(value) = bincode::deserialize(&raw)? {
                if let Some(index_key) = index_key(predicate, &value, uid) {
                    self.index.insert(index_key, Vec::<u8>::new())?;
                    backfilled += 1;
                }
            }
        }

        self.schema.insert(predicate.as_bytes(), EXACT_INDEX)?;
        info!(predicate, backfilled, "declared exact index");
        Ok(())
    }
}

fn read_stored(
    tree: &TransactionalTree,
    key: &[u8],
) -> Result<Option<StoredEdge>, ConflictableTransactionError<StoreError>> {
    match tree.get(key)? {
        Some(raw) => bincode::deserialize(&raw)
            .map(Some)
            .map_err(|e| ConflictableTransactionError::Abort(StoreError::Encoding(e))),
        None => Ok(None),
    }
}

fn write_stored(
    tree: &TransactionalTree,
    key: Vec<u8>,
    stored: &StoredEdge,
) -> Result<(), ConflictableTransactionError<StoreError>> {
    let raw = bincode::serialize(stored)
        .map_err(|e| ConflictableTransactionError::Abort(StoreError::Encoding(e)))?;
    tree.insert(key, raw)?;
    Ok(())
}

fn edge_key(uid: Uid, predicate: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + predicate.len());
    key.extend_from_slice(&uid.to_be_bytes());
    key.extend_from_slice(predicate.as_bytes());
    key
}

fn index_prefix(predicate: &str, term: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(predicate.len() + 5 + term.len() + 8);
    key.extend_from_slice(predicate.as_bytes());
    key.push(0);
    key.extend_from_slice(&(term.len() as u32).to_be_bytes());
    key.extend_from_slice(term);
    key
}

/// Index key for a scalar; only strings carry exact-match terms
fn index_key(predicate: &str, value: &Value, uid: Uid) -> Option<Vec<u8>> {
    let term = value.as_str()?;
    let mut key = index_prefix(predicate, term.as_bytes());
    key.extend_from_slice(&uid.to_be_bytes());
    Some(key)
}

fn uid_prefix(key: &[u8]) -> Result<Uid, StoreError> {
    key.get(..8)
        .and_then(|b| b.try_into().ok())
        .map(Uid::from_be_bytes)
        .ok_or_else(|| StoreError::Corrupt(format!("edge key too short: {} bytes", key.len())))
}

fn uid_suffix(key: &[u8]) -> Result<Uid, StoreError> {
    key.len()
        .checked_sub(8)
        .and_then(|start| key[start..].try_into().ok())
        .map(Uid::from_be_bytes)
        .ok_or_else(|| StoreError::Corrupt(format!("index key too short: {} bytes", key.len())))
}
