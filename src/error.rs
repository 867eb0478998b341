use thiserror::Error;

/// Result alias for graph, community and ranking operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by the in-memory movie network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An operation referenced a title never added as a movie.
    #[error("unknown movie: {0}")]
    UnknownVertex(String),

    /// The arena already holds as many vertices as `VInt` can address.
    #[error("vertex limit reached: {0} movies")]
    VertexLimit(usize),

    /// A detector or query parameter was out of range.
    #[error("invalid parameter `{name}`: {message}")]
    InvalidParameter {
        name: &'static str,
        message: &'static str,
    },
}
