//! Error type for vector operations.

use thiserror::Error;

/// Failure of a [`Vector`](crate::Vector) operation.
///
/// Every failing operation leaves the container as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    /// The cloner could not produce an element, or the storage is full.
    #[error("allocation failed")]
    AllocationFailure,

    /// Index outside the valid range for the operation.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Length of the vector at the time of the call.
        len: usize,
    },

    /// The operation needs at least one element.
    #[error("vector is empty")]
    EmptyContainer,

    /// A required argument was absent.
    #[error("required argument is absent")]
    NullArgument,

    /// A link invariant does not hold at the node with this slot position.
    #[error("chain links are inconsistent at slot {slot}")]
    CorruptChain {
        /// Slot position of the offending node.
        slot: usize,
    },
}
