use serde_json::{Map, Value, json};

/// Builder for the interpolation context.
///
/// Recognized namespaces are `job`, `node` and `instance`; anything else goes in
/// as a custom top-level key.
#[derive(Debug, Clone, Default)]
pub struct InterpolationContext {
    root: Map<String, Value>,
}

impl InterpolationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(mut self, id: impl Into<String>) -> Self {
        self.root.insert("job".to_string(), json!({ "id": id.into() }));
        self
    }

    pub fn node(mut self, id: impl Into<String>, path: impl Into<String>) -> Self {
        self.root.insert(
            "node".to_string(),
            json!({ "id": id.into(), "path": path.into() }),
        );
        self
    }

    pub fn instance(
        mut self,
        id: impl Into<String>,
        path: impl Into<String>,
        index: usize,
    ) -> Self {
        self.root.insert(
            "instance".to_string(),
            json!({ "id": id.into(), "path": path.into(), "index": index }),
        );
        self
    }

    pub fn custom(mut self, key: impl Into<String>, value: Value) -> Self {
        self.root.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.root)
    }
}

impl From<InterpolationContext> for Value {
    fn from(ctx: InterpolationContext) -> Self {
        ctx.build()
    }
}

/// Copy `context` and force `job.id` to `job_id`.
///
/// The job identity always wins over whatever the caller put under `job`.
/// A non-object context is treated as empty.
pub fn merge_job(context: &Value, job_id: &str) -> Value {
    let mut root = match context {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    root.insert("job".to_string(), json!({ "id": job_id }));
    Value::Object(root)
}
