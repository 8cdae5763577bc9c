//! Error types for store operations.

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reported by a [`crate::KvStore`] implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Channel closed (store shutting down or connection lost)
    #[error("Channel closed")]
    ChannelClosed,

    /// Operation timeout
    #[error("Operation timeout")]
    Timeout,

    /// Store returned an error (e.g. ACL rejection, internal error)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Transport failure between the client and the store
    #[error("Network error: {0}")]
    NetworkError(String),
}
