//! Error types for handle-taking graph operations.

/// The error type reported by [`Digraph`](crate::Digraph) operations.
///
/// Errors are local to the failing call: a failed operation never leaves the
/// graph partially mutated and never invalidates other handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// A stale handle: issued by this graph, but its slot has since been
    /// freed (and possibly reused under a new generation), or the whole
    /// graph has been cleared.
    InvalidHandle,
    /// A handle issued by a different graph instance. Distinct from
    /// [`GraphError::InvalidHandle`] so that cross-graph misuse is
    /// detectable even on a handle that is syntactically well-formed.
    WrongOwner,
    /// An index argument exceeded the valid bound for the operation.
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The exclusive upper bound the index was checked against.
        bound: usize,
    },
    /// An argument that is representable but meaningless here, e.g. the
    /// null handle where a live node is required.
    InvalidArgument(&'static str),
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidHandle => f.write_str("stale handle: the referenced slot was freed"),
            Self::WrongOwner => f.write_str("handle was issued by a different graph"),
            Self::OutOfRange { index, bound } => {
                write!(f, "index {index} out of range (bound {bound})")
            }
            Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Specialized `Result` type for graph operations.
pub type Result<T> = core::result::Result<T, GraphError>;
