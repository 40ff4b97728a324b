//! Error types for store operations.

use thiserror::Error;
use tubechat_transport::TransportError;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by the stores.
///
/// Remote failures are also recorded in the owning store's `error` field
/// before being returned.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A local precondition was not met.
    #[error("No active chat")]
    NoActiveChat,

    /// The backend call failed.
    #[error(transparent)]
    Remote(#[from] TransportError),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::NoActiveChat)
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StoreError::Remote(_))
    }

    /// Description suitable for display, if the failure carries one.
    pub fn describe(&self) -> Option<String> {
        match self {
            StoreError::Remote(err) => err.describe(),
            other => Some(other.to_string()),
        }
    }
}
