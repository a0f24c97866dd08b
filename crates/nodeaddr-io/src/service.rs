//! Hybrid Address Service: read, write and push content by address.
//!
//! Every operation validates the address locally first, then makes exactly one
//! call into the injected [`ContentStore`]. Store failures come back as
//! [`EngineError::Remote`] with the originating `method(args)` attached, except
//! the store's not-found signal, which becomes [`EngineError::NotFound`].

use nodeaddr_core::{AddressValidation, HybridAddress, ParsedAddress, validate_address};
use nodeaddr_interp::{interpolate_json, merge_job};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EngineError, RemoteError};
use crate::port::{ContentStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Substring of a store error message that means "node does not exist".
    pub not_found_marker: String,
    /// Include payload values in debug logs.
    pub log_values: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            not_found_marker: "Node not found".to_string(),
            log_values: false,
        }
    }
}

/// What is at an address: nothing, an explicit `null`, or a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Missing,
    Null,
    Value(Value),
}

impl Lookup {
    pub fn exists(&self) -> bool {
        !matches!(self, Lookup::Missing)
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Value(v) => Some(v),
            Lookup::Missing | Lookup::Null => None,
        }
    }
}

pub struct HybridAddressService<S> {
    store: S,
    options: ServiceOptions,
}

impl<S: ContentStore> HybridAddressService<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, ServiceOptions::default())
    }

    pub fn with_options(store: S, options: ServiceOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Local grammar check; never touches the store.
    pub fn validate_address(&self, address: &str) -> AddressValidation {
        validate_address(address)
    }

    /// Parse `address` through the store.
    #[tracing::instrument(name = "parse_address", skip(self))]
    pub async fn parse_address(&self, address: &str) -> Result<ParsedAddress, EngineError> {
        HybridAddress::parse(address)?;
        debug!(method = "parse_hybrid_addr", "remote call");

        let rows = self.store.parse_hybrid_addr(address).await.map_err(|e| {
            warn!(method = "parse_hybrid_addr", code = ?e.code, "remote call failed");
            let remote = RemoteError::from_store(e, format!("parse_hybrid_addr({address})"));
            EngineError::AddressParse {
                address: address.to_string(),
                reason: remote.message.clone(),
                source: Some(remote),
            }
        })?;

        let malformed = |reason: String| EngineError::AddressParse {
            address: address.to_string(),
            reason,
            source: None,
        };
        let Some(row) = rows.into_iter().next() else {
            return Err(malformed("store returned no rows".to_string()));
        };
        let parsed = HybridAddress::new(&row.ltree_path, row.json_keys)
            .map_err(|e| malformed(format!("store returned a malformed row: {e}")))?;
        Ok(parsed.into_parts())
    }

    /// Value stored at `address`. `null` means "no value yet", not "missing".
    #[tracing::instrument(name = "get_item_at", skip(self))]
    pub async fn get_item_at(&self, job_id: &str, address: &str) -> Result<Value, EngineError> {
        HybridAddress::parse(address)?;
        debug!(method = "json_resolve_by_path", "remote call");

        let value = self
            .store
            .json_resolve_by_path(job_id, address)
            .await
            .map_err(|e| {
                self.classify(e, format!("json_resolve_by_path({job_id}, {address})"))
            })?;

        if self.options.log_values {
            debug!(%value, "resolved");
        }
        Ok(value)
    }

    /// Store `value` at `address`. The value is sent as JSON text.
    #[tracing::instrument(name = "set_item_at", skip(self, value))]
    pub async fn set_item_at(
        &self,
        job_id: &str,
        address: &str,
        value: &Value,
    ) -> Result<(), EngineError> {
        HybridAddress::parse(address)?;
        let encoded = serde_json::to_string(value)?;
        if self.options.log_values {
            debug!(method = "json_set_by_path", value = %encoded, "remote call");
        } else {
            debug!(method = "json_set_by_path", "remote call");
        }

        self.store
            .json_set_by_path(job_id, address, &encoded)
            .await
            .map_err(|e| {
                self.classify(e, format!("json_set_by_path({job_id}, {address})"))
            })?;
        Ok(())
    }

    /// Interpolate `payload` against `context` (with `job.id` forced to
    /// `job_id`) and store the result at `target`.
    #[tracing::instrument(name = "push_payload", skip(self, payload, context))]
    pub async fn push_payload(
        &self,
        job_id: &str,
        target: &str,
        payload: &Value,
        context: &Value,
    ) -> Result<(), EngineError> {
        let ctx = merge_job(context, job_id);
        let rendered = interpolate_json(payload, &ctx);
        self.set_item_at(job_id, target, &rendered).await
    }

    /// `false` only on the store's not-found signal; other failures propagate.
    #[tracing::instrument(name = "address_exists", skip(self))]
    pub async fn address_exists(&self, job_id: &str, address: &str) -> Result<bool, EngineError> {
        match self.get_item_at(job_id, address).await {
            Ok(_) => Ok(true),
            Err(EngineError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Tri-state lookup separating a missing node from a stored `null`.
    pub async fn lookup(&self, job_id: &str, address: &str) -> Result<Lookup, EngineError> {
        match self.get_item_at(job_id, address).await {
            Ok(Value::Null) => Ok(Lookup::Null),
            Ok(v) => Ok(Lookup::Value(v)),
            Err(EngineError::NotFound { .. }) => Ok(Lookup::Missing),
            Err(e) => Err(e),
        }
    }

    fn classify(&self, err: StoreError, context: String) -> EngineError {
        if err.message.contains(&self.options.not_found_marker) {
            debug!(%context, "not found");
            return EngineError::NotFound {
                context,
                message: err.message,
            };
        }
        warn!(%context, code = ?err.code, "remote call failed");
        EngineError::Remote(RemoteError::from_store(err, context))
    }
}
