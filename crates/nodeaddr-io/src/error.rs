//! Engine error taxonomy.

use nodeaddr_core::AddressFormatError;

use crate::port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Rejected by the local grammar; no remote call was made.
    #[error(transparent)]
    Format(#[from] AddressFormatError),

    /// The store could not parse the address, or returned an unusable row.
    /// `source` is set when the store call itself failed.
    #[error("failed to parse address '{address}': {reason}")]
    AddressParse {
        address: String,
        reason: String,
        source: Option<RemoteError>,
    },

    /// The store reported that the node does not exist.
    #[error("{context}: {message}")]
    NotFound { context: String, message: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("failed to encode value as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }

    /// Transport code of a remote failure, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            EngineError::Remote(e) => e.code.as_deref(),
            EngineError::AddressParse { source, .. } => {
                source.as_ref().and_then(|e| e.code.as_deref())
            }
            _ => None,
        }
    }
}

/// A store failure with the originating call attached as `context`
/// (`method(args)`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{context}: {message}")]
pub struct RemoteError {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
    pub context: String,
}

impl RemoteError {
    pub fn from_store(err: StoreError, context: impl Into<String>) -> Self {
        Self {
            message: err.message,
            code: err.code,
            details: err.details,
            hint: err.hint,
            context: context.into(),
        }
    }
}
