use thiserror::Error;

/// Errors returned by graph operations.
///
/// Set and map operations cannot fail; only the graph has preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An operation required a vertex that is not present in the graph.
    #[error("missing vertex in graph: {0}")]
    MissingVertex(String),

    /// A query referenced a vertex that is not present in the graph.
    #[error("unknown vertex: {0}")]
    UnknownVertex(String),

    /// A merge was requested without a peer replica.
    #[error("cannot merge, peer replica is absent")]
    NilPeer,
}

/// Result type for fallible CRDT operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
