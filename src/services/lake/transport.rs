use crate::api::middleware::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the lake's version endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LakeVersion {
    pub version: String,
}

/// Transport to the lake query engine
#[async_trait::async_trait]
pub trait LakeTransport: Send + Sync {
    /// Run a query and return its result values in the order the lake produced them
    async fn query(&self, query: &str) -> Result<Vec<Value>, AppError>;

    /// Fetch the lake's version
    async fn version(&self) -> Result<LakeVersion, AppError>;

    /// Base URL, for diagnostics
    fn base_url(&self) -> &str;

    /// Full URL of an endpoint under the base URL
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url().trim_end_matches('/'), path)
    }
}
