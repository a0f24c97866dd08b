//! In-memory [`ContentStore`] for tests, fixtures and the CLI.
//!
//! Jobs map ltree paths to node content. Within a node, JSON keys walk objects
//! by name and arrays by `iN` segments (the form produced by `normalize_path`).
//! Failures carry PostgreSQL-style codes so callers exercise the same error
//! paths they would see against a real store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use nodeaddr_core::{HybridAddress, ParsedAddress};
use serde_json::{Map, Value};

use crate::port::{ContentStore, ParsedAddrRow, StoreError};

/// Content of one job, keyed by ltree path.
pub type JobNodes = BTreeMap<String, Value>;

const INVALID_TEXT: &str = "22P02";
const INVALID_PARAMETER: &str = "22023";
const NO_DATA_FOUND: &str = "P0002";

#[derive(Debug, Default)]
pub struct MemoryStore {
    jobs: RwLock<BTreeMap<String, JobNodes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_jobs(jobs: BTreeMap<String, JobNodes>) -> Self {
        Self {
            jobs: RwLock::new(jobs),
        }
    }

    /// Seed (or replace) the content of one node.
    pub fn insert_node(
        &self,
        job_id: &str,
        ltree_path: &str,
        content: Value,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().map_err(lock_error)?;
        jobs.entry(job_id.to_string())
            .or_default()
            .insert(ltree_path.to_string(), content);
        Ok(())
    }

    pub fn snapshot_job(&self, job_id: &str) -> Result<Option<JobNodes>, StoreError> {
        let jobs = self.jobs.read().map_err(lock_error)?;
        Ok(jobs.get(job_id).cloned())
    }

    pub fn snapshot(&self) -> Result<BTreeMap<String, JobNodes>, StoreError> {
        let jobs = self.jobs.read().map_err(lock_error)?;
        Ok(jobs.clone())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn parse_hybrid_addr(&self, address: &str) -> Result<Vec<ParsedAddrRow>, StoreError> {
        let addr = parse(address)?;
        let ParsedAddress {
            ltree_path,
            json_keys,
        } = addr.into_parts();
        Ok(vec![ParsedAddrRow {
            ltree_path,
            json_keys,
        }])
    }

    async fn json_resolve_by_path(&self, job_id: &str, address: &str) -> Result<Value, StoreError> {
        let addr = parse(address)?;
        let jobs = self.jobs.read().map_err(lock_error)?;

        let node = jobs
            .get(job_id)
            .and_then(|nodes| nodes.get(addr.ltree_path()))
            .ok_or_else(|| {
                StoreError::new(format!("Node not found: {}", addr.ltree_path()))
                    .with_code(NO_DATA_FOUND)
            })?;

        let mut cur = node;
        for key in addr.json_keys() {
            match step(cur, key) {
                Some(next) => cur = next,
                None => return Ok(Value::Null),
            }
        }
        Ok(cur.clone())
    }

    async fn json_set_by_path(
        &self,
        job_id: &str,
        address: &str,
        value_json: &str,
    ) -> Result<Value, StoreError> {
        let value: Value = serde_json::from_str(value_json).map_err(|e| {
            StoreError::new("invalid input syntax for type json")
                .with_code(INVALID_TEXT)
                .with_details(e.to_string())
        })?;
        let addr = parse(address)?;

        let mut jobs = self.jobs.write().map_err(lock_error)?;
        let node = jobs
            .entry(job_id.to_string())
            .or_default()
            .entry(addr.ltree_path().to_string())
            .or_insert(Value::Null);

        let Some((last, parents)) = addr.json_keys().split_last() else {
            *node = value.clone();
            return Ok(value);
        };

        let mut cur = node;
        for key in parents {
            cur = step_mut(cur, key)?;
        }
        put(cur, last, value.clone())?;
        Ok(value)
    }
}

fn parse(address: &str) -> Result<HybridAddress, StoreError> {
    HybridAddress::parse(address).map_err(|e| {
        StoreError::new(format!("invalid hybrid address: {address}"))
            .with_code(INVALID_TEXT)
            .with_details(e.to_string())
    })
}

fn lock_error<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::new(format!("store lock poisoned: {e}"))
}

/// `i3` -> 3.
fn array_index(key: &str) -> Option<usize> {
    key.strip_prefix('i')?.parse().ok()
}

fn step<'a>(cur: &'a Value, key: &str) -> Option<&'a Value> {
    match cur {
        Value::Object(map) => map.get(key),
        Value::Array(list) => list.get(array_index(key)?),
        _ => None,
    }
}

/// Descend into `key`, creating an object when nothing is there yet.
fn step_mut<'a>(cur: &'a mut Value, key: &str) -> Result<&'a mut Value, StoreError> {
    if cur.is_null() {
        *cur = Value::Object(Map::new());
    }
    match cur {
        Value::Object(map) => Ok(map.entry(key.to_string()).or_insert(Value::Null)),
        Value::Array(list) => {
            let len = list.len();
            array_index(key)
                .and_then(|i| list.get_mut(i))
                .ok_or_else(|| out_of_range(key, len))
        }
        _ => Err(not_a_container(key)),
    }
}

fn put(cur: &mut Value, key: &str, value: Value) -> Result<(), StoreError> {
    if cur.is_null() {
        *cur = Value::Object(Map::new());
    }
    match cur {
        Value::Object(map) => {
            map.insert(key.to_string(), value);
            Ok(())
        }
        Value::Array(list) => match array_index(key) {
            Some(i) if i < list.len() => {
                list[i] = value;
                Ok(())
            }
            Some(i) if i == list.len() => {
                list.push(value);
                Ok(())
            }
            _ => Err(out_of_range(key, list.len())),
        },
        _ => Err(not_a_container(key)),
    }
}

fn out_of_range(key: &str, len: usize) -> StoreError {
    StoreError::new(format!("array index '{key}' out of range"))
        .with_code(INVALID_PARAMETER)
        .with_details(format!("array length is {len}"))
}

fn not_a_container(key: &str) -> StoreError {
    StoreError::new(format!("cannot set key '{key}' inside a scalar value"))
        .with_code(INVALID_PARAMETER)
        .with_hint("set the parent to an object first")
}
