//! Edgewise: Struct-to-Graph Marshalling
//!
//! Maps typed records onto graph nodes and edges, writes them as atomic
//! mutation batches, reads them back by identity and caches identity-to-node
//! lookups in an adaptive replacement cache.

extern crate self as edgewise;

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod record;
pub mod store;
pub mod tag;
pub mod tooling;
pub mod types;
pub mod walker;

pub use edgewise_derive::Fields;

pub use cache::IdentityCache;
pub use error::{CodecError, MapperError, StoreError};
pub use mapper::Mapper;
pub use record::{Dataful, Identifiable, Identity, Typed};
pub use store::{GraphStore, Node, Value};
pub use tag::TagOptions;
pub use walker::{FieldDescriptor, FieldInfo, FieldSlot, FieldValue, Fields};
