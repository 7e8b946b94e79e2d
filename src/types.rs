//! Core types shared by the mapper and the graph store.

/// Uid: store-assigned identifier of a graph node. Zero is never allocated.
pub type Uid = u64;

/// Reserved edge holding the lowercased type tag of a written record
pub const TYPE_PREDICATE: &str = "_type";

/// Reserved edge holding the identity string of a written record
pub const IDENTITY_PREDICATE: &str = "_identity";

/// Pseudo-predicate selecting the uid of a matched node
pub const UID_PREDICATE: &str = "_uid_";
