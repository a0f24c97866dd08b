//! The remote content store, as seen by the engine.
//!
//! Three calls, mirroring the remote procedure surface one-for-one. Values
//! cross the boundary as JSON; `json_set_by_path` takes the value already
//! encoded as JSON text.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the remote address parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddrRow {
    pub ltree_path: String,
    #[serde(default)]
    pub json_keys: Vec<String>,
}

/// A raw transport failure, before the engine attaches call context.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Parse an address server-side. An empty result means the address was rejected.
    async fn parse_hybrid_addr(&self, address: &str) -> Result<Vec<ParsedAddrRow>, StoreError>;

    /// Value stored at `address` in job `job_id`; `null` when nothing is set there.
    async fn json_resolve_by_path(&self, job_id: &str, address: &str) -> Result<Value, StoreError>;

    /// Store the JSON text `value_json` at `address` and return what was stored.
    async fn json_set_by_path(
        &self,
        job_id: &str,
        address: &str,
        value_json: &str,
    ) -> Result<Value, StoreError>;
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    async fn parse_hybrid_addr(&self, address: &str) -> Result<Vec<ParsedAddrRow>, StoreError> {
        (**self).parse_hybrid_addr(address).await
    }

    async fn json_resolve_by_path(&self, job_id: &str, address: &str) -> Result<Value, StoreError> {
        (**self).json_resolve_by_path(job_id, address).await
    }

    async fn json_set_by_path(
        &self,
        job_id: &str,
        address: &str,
        value_json: &str,
    ) -> Result<Value, StoreError> {
        (**self).json_set_by_path(job_id, address, value_json).await
    }
}
