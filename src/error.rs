//! Error types for each layer: store, codec, mapper and the CLI/config surface.

use thiserror::Error;

/// Failures raised by a graph store or while staging edges for one.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("predicate {0} is not indexed")]
    NotIndexed(String),

    #[error("edge {0} has no value")]
    UnsetEdge(String),

    #[error("edge {0} is already connected to a node")]
    Connected(String),

    #[error("edge {0} already holds a scalar value")]
    Valued(String),

    #[error("edge {0} cannot be connected to an empty node")]
    EmptyTarget(String),

    #[error("uid values on edge {0} must be set with connect_to")]
    UidValue(String),

    #[error("corrupt store entry: {0}")]
    Corrupt(String),
}

/// Failures converting field values to and from store scalars.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("empty value")]
    Empty,

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Edge(#[from] StoreError),
}

/// Failures surfaced by the record mapper.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("type name was empty")]
    EmptyTypeName,

    #[error("value is not a struct")]
    NotStruct,

    #[error("empty value")]
    Empty,

    #[error("setEdge: {0}")]
    SetEdge(#[source] CodecError),

    #[error("set: {0}")]
    Set(#[source] StoreError),

    #[error("run: {0}")]
    Run(#[source] StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no node for identity {0:?}")]
    Unresolved(String),

    #[error("decode {edge}: {source}")]
    Decode {
        edge: String,
        #[source]
        source: CodecError,
    },
}

impl MapperError {
    /// True when a field value was rejected for being empty
    pub fn is_empty_value(&self) -> bool {
        matches!(self, MapperError::SetEdge(CodecError::Empty))
    }
}

/// Errors at the configuration, logging and CLI surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("storage error: {0}")]
    StorageError(#[from] StoreError),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
