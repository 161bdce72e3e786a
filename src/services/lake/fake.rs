// Scripted in-memory lake for tests

use crate::api::middleware::AppError;
use crate::services::lake::transport::{LakeTransport, LakeVersion};
use crate::services::schema_prober::{POOL_DISCOVERY_QUERY, SCHEMA_SAMPLE_SUFFIX, SHAPE_CHECK_SUFFIX};
use serde_json::{json, Value};
use std::sync::Mutex;

type Handler = Box<dyn Fn(&str) -> Result<Vec<Value>, AppError> + Send + Sync>;

pub struct ScriptedLake {
    handler: Handler,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLake {
    pub fn new(
        handler: impl Fn(&str) -> Result<Vec<Value>, AppError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Lake holding one uniformly shaped table: `fields` as (key, type tag) plus its rows
    pub fn table(fields: &[(&str, &str)], rows: Vec<Value>) -> Self {
        let shapes = if rows.is_empty() { 0 } else { 1 };
        let sample: Vec<Value> = fields
            .iter()
            .map(|(key, tag)| json!({"key": key, "type": format!("<{}>", tag)}))
            .collect();
        Self::new(move |query| {
            if is_shape_check(query) {
                Ok(vec![json!(shapes)])
            } else if is_schema_sample(query) {
                Ok(sample.clone())
            } else {
                Ok(rows.clone())
            }
        })
    }

    /// Queries received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn is_shape_check(query: &str) -> bool {
    query.ends_with(SHAPE_CHECK_SUFFIX)
}

pub fn is_schema_sample(query: &str) -> bool {
    query.ends_with(SCHEMA_SAMPLE_SUFFIX)
}

pub fn is_pool_discovery(query: &str) -> bool {
    query == POOL_DISCOVERY_QUERY
}

#[async_trait::async_trait]
impl LakeTransport for ScriptedLake {
    async fn query(&self, query: &str) -> Result<Vec<Value>, AppError> {
        self.calls.lock().unwrap().push(query.to_string());
        (self.handler)(query)
    }

    async fn version(&self) -> Result<LakeVersion, AppError> {
        Ok(LakeVersion {
            version: "test".to_string(),
        })
    }

    fn base_url(&self) -> &str {
        "http://scripted-lake"
    }
}
