//! Record Mapper
//!
//! Writes records as graph nodes, resolves identities to nodes through the
//! identity cache, connects records by named relations and populates records
//! from stored edges.

use crate::cache::{IdentityCache, DEFAULT_CAPACITY};
use crate::codec::{encode, encode_json, escape_quotes, is_blank, set_edge, Decode, Encode};
use crate::config::CacheConfig;
use crate::error::{CodecError, MapperError};
use crate::record::Identifiable;
use crate::store::{Function, GraphStore, Mutation, Node, QueryNode, Selection};
use crate::types::{IDENTITY_PREDICATE, TYPE_PREDICATE};
use crate::walker::{walk, walk_mut, FieldSlot, FieldValue, Fields};
use std::sync::Arc;
use tracing::{debug, info};

/// Object-to-graph mapper over a [`GraphStore`]
pub struct Mapper {
    store: Arc<dyn GraphStore>,
    cache: IdentityCache,
}

impl Mapper {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self::with_capacity(store, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(store: Arc<dyn GraphStore>, capacity: usize) -> Self {
        Self {
            store,
            cache: IdentityCache::new(capacity),
        }
    }

    pub fn from_config(store: Arc<dyn GraphStore>, config: &CacheConfig) -> Self {
        Self::with_capacity(store, config.capacity)
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn purge_cache(&self) {
        self.cache.purge();
        debug!("identity cache purged");
    }

    /// Declare the exact-match indexes lookups depend on. Idempotent.
    pub fn bootstrap_schema(&self) -> Result<(), MapperError> {
        self.store.declare_index(IDENTITY_PREDICATE)?;
        self.store.declare_index(TYPE_PREDICATE)?;
        Ok(())
    }

    /// Write `record` as a new node and cache it under its identity.
    ///
    /// All edges are staged locally and executed as one batch; nothing is
    /// submitted if any field fails to encode.
    pub fn write<R>(&self, record: &R) -> Result<Node, MapperError>
    where
        R: Identifiable + Fields,
    {
        let identity = record.identity();
        let target: &dyn Fields = match record.dataful() {
            Some(dataful) => dataful.data(),
            None => record,
        };

        if target.field_infos().is_none() {
            return Err(MapperError::NotStruct);
        }
        let type_tag = match record.typed() {
            Some(typed) => typed.type_tag(),
            None => target.type_name().to_string(),
        };
        if type_tag.trim().is_empty() {
            return Err(MapperError::EmptyTypeName);
        }
        if identity.trim().is_empty() {
            return Err(MapperError::SetEdge(CodecError::Empty));
        }

        let node = self.store.blank_node(&identity)?;
        let mut mutation = Mutation::new();

        for (predicate, value) in [
            (TYPE_PREDICATE, type_tag.to_lowercase()),
            (IDENTITY_PREDICATE, identity.clone()),
        ] {
            let mut edge = node.edge(predicate);
            let value = encode(value.as_str()).map_err(MapperError::SetEdge)?;
            set_edge(&mut edge, value).map_err(MapperError::SetEdge)?;
            mutation.set(edge).map_err(MapperError::Set)?;
        }

        stage_fields(&mut mutation, node, target, "")?;

        let staged = mutation.len();
        self.store.execute(mutation).map_err(MapperError::Run)?;
        self.cache.put(&identity, node);

        info!(identity = %identity, node = %node, edges = staged, "record written");
        Ok(node)
    }

    /// Resolve an identity to its node. The empty node means no match.
    pub fn fetch(&self, identity: &str) -> Result<Node, MapperError> {
        if let Some(node) = self.cache.get(identity) {
            debug!(identity, node = %node, "identity cache hit");
            return Ok(node);
        }

        let response = self.store.query(
            &Function::eq(IDENTITY_PREDICATE, &escape_quotes(identity)),
            &[Selection::uid()],
        )?;

        let Some(found) = response.nodes.first() else {
            debug!(identity, "identity not found");
            return Ok(Node::empty());
        };

        let node = Node::from_uid(found.uid);
        self.cache.put(identity, node);
        debug!(identity, node = %node, "identity cache miss resolved");
        Ok(node)
    }

    /// Node for an existing record
    pub fn node(&self, record: &dyn Identifiable) -> Result<Node, MapperError> {
        self.fetch(&record.identity())
    }

    /// Add a `relation` edge from `from` to `to`. Both must already be written.
    pub fn connect(
        &self,
        from: &dyn Identifiable,
        relation: &str,
        to: &dyn Identifiable,
    ) -> Result<(), MapperError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;

        let edge = source
            .connect_to(relation, &target)
            .map_err(MapperError::Set)?;
        let mut mutation = Mutation::new();
        mutation.set(edge).map_err(MapperError::Set)?;
        self.store.execute(mutation).map_err(MapperError::Run)?;

        info!(from = %source, relation, to = %target, "records connected");
        Ok(())
    }

    /// Populate `target` from the edges stored on the node matching `identity`.
    ///
    /// Only scalar fields are read; stored edges with no matching field are
    /// ignored.
    pub fn scan(&self, identity: &str, target: &mut dyn Fields) -> Result<(), MapperError> {
        let mut edges = Vec::new();
        walk(&*target, |descriptor, value| {
            if let FieldValue::Scalar(_) = value {
                edges.push(descriptor.edge.clone());
            }
            Ok(())
        })?;

        let selections: Vec<Selection> = edges.iter().map(|e| e.as_str().into()).collect();
        let Some(found) = self.fetch_values(identity, &selections)? else {
            return Err(MapperError::Empty);
        };

        walk_mut(target, |descriptor, slot| {
            let FieldSlot::Scalar(field) = slot else {
                return Ok(());
            };
            if let Some(value) = found.property(&descriptor.edge) {
                field.assign(value).map_err(|source| MapperError::Decode {
                    edge: descriptor.edge.clone(),
                    source,
                })?;
            }
            Ok(())
        })?;

        debug!(identity, properties = found.properties.len(), "record scanned");
        Ok(())
    }

    /// First node matching `identity`, with the requested predicates
    pub fn fetch_values(
        &self,
        identity: &str,
        selections: &[Selection],
    ) -> Result<Option<QueryNode>, MapperError> {
        let response = self.store.query(
            &Function::eq(IDENTITY_PREDICATE, &escape_quotes(identity)),
            selections,
        )?;
        Ok(response.nodes.into_iter().next())
    }

    /// Every node written with `type_tag`
    pub fn nodes_of_type(&self, type_tag: &str) -> Result<Vec<Node>, MapperError> {
        let response = self.store.query(
            &Function::eq(TYPE_PREDICATE, &escape_quotes(&type_tag.to_lowercase())),
            &[Selection::uid()],
        )?;
        Ok(response
            .nodes
            .iter()
            .map(|n| Node::from_uid(n.uid))
            .collect())
    }

    fn resolve(&self, record: &dyn Identifiable) -> Result<Node, MapperError> {
        let identity = record.identity();
        let node = self.fetch(&identity)?;
        if node.is_empty() {
            return Err(MapperError::Unresolved(identity));
        }
        Ok(node)
    }
}

/// Stage one edge per scalar field of `target`, recursing into inline fields.
fn stage_fields(
    mutation: &mut Mutation,
    node: Node,
    target: &dyn Fields,
    prefix: &str,
) -> Result<(), MapperError> {
    walk(target, |descriptor, value| {
        let name = format!("{}{}", prefix, descriptor.edge);
        match value {
            FieldValue::Skipped => Ok(()),
            FieldValue::Nested(_) => {
                debug!(edge = %name, "skipping nested record field");
                Ok(())
            }
            FieldValue::Composite(inner) => {
                let inner_prefix = if descriptor.options.prefix {
                    format!("{}_", name)
                } else {
                    prefix.to_string()
                };
                stage_fields(mutation, node, inner, &inner_prefix)
            }
            FieldValue::Scalar(field) => {
                let json = field.to_json().map_err(MapperError::SetEdge)?;
                if descriptor.options.omit_empty && is_blank(&json) {
                    debug!(edge = %name, "omitting empty field");
                    return Ok(());
                }

                let value = encode_json(json).map_err(MapperError::SetEdge)?;
                let mut edge = node.edge(&name);
                set_edge(&mut edge, value).map_err(MapperError::SetEdge)?;
                mutation.set(edge).map_err(MapperError::Set)?;
                debug!(edge = %name, "staged edge");
                Ok(())
            }
        }
    })
}
