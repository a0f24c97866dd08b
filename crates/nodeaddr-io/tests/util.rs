use std::sync::Mutex;

use async_trait::async_trait;
use nodeaddr_io::prelude::*;
use serde_json::{Value, json};

/// Store whose every call fails (or succeeds) the same scripted way, and which
/// records the calls it receives.
#[allow(dead_code)]
pub struct ScriptedStore {
    pub failure: Option<StoreError>,
    pub rows: Vec<ParsedAddrRow>,
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedStore {
    pub fn failing(err: StoreError) -> Self {
        Self {
            failure: Some(err),
            rows: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: Vec<ParsedAddrRow>) -> Self {
        Self {
            failure: None,
            rows,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn parse_hybrid_addr(&self, address: &str) -> Result<Vec<ParsedAddrRow>, StoreError> {
        self.record(format!("parse_hybrid_addr({address})"))?;
        Ok(self.rows.clone())
    }

    async fn json_resolve_by_path(&self, job_id: &str, address: &str) -> Result<Value, StoreError> {
        self.record(format!("json_resolve_by_path({job_id}, {address})"))?;
        Ok(json!(null))
    }

    async fn json_set_by_path(
        &self,
        job_id: &str,
        address: &str,
        value_json: &str,
    ) -> Result<Value, StoreError> {
        let call = format!("json_set_by_path({job_id}, {address}, {value_json})");
        self.record(call)?;
        Ok(json!(null))
    }
}

#[allow(dead_code)]
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert_node(
            "job-1",
            "root.user_input",
            json!({
                "characters": {
                    "lead": { "character_name": { "value": "Ada" } }
                },
                "scenes": [{ "title": "Dock" }, { "title": "Lighthouse" }],
                "notes": null
            }),
        )
        .expect("seed store");
    store
}
