// Lake client over the HTTP API
//
// POST /query with {"query": ...} returns the result values as a JSON array
// (older lakes stream newline-delimited JSON instead; both are accepted).
// GET /version returns {"version": ...}.

use crate::api::middleware::AppError;
use crate::models::DataSourceSettings;
use crate::services::lake::transport::{LakeTransport, LakeVersion};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub struct HttpLakeClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct LakeQueryRequest<'a> {
    query: &'a str,
}

impl HttpLakeClient {
    pub fn new(settings: &DataSourceSettings, timeout: Duration) -> Result<Self, AppError> {
        let raw = settings.base_url();
        let url = Url::parse(raw)
            .map_err(|e| AppError::Validation(format!("Invalid lake URL '{}': {}", raw, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::Validation(format!(
                "Lake URL must use http:// or https:// (got {})",
                raw
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn transport_error(url: &str, err: reqwest::Error) -> AppError {
        let message = if err.is_timeout() {
            format!("request timed out ({})", err)
        } else if err.is_connect() {
            format!("could not connect ({})", err)
        } else {
            err.to_string()
        };
        AppError::Transport {
            url: url.to_string(),
            message,
        }
    }

    async fn check_status(url: &str, response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(AppError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

/// Parse a query response body into its values
pub fn parse_query_body(body: &str) -> Result<Vec<Value>, AppError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(values)) => Ok(values),
        Ok(value) => Ok(vec![value]),
        Err(_) => body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                serde_json::from_str::<Value>(line).map_err(|e| {
                    AppError::InvalidResponse(format!("Failed to parse query response: {}", e))
                })
            })
            .collect(),
    }
}

#[async_trait::async_trait]
impl LakeTransport for HttpLakeClient {
    async fn query(&self, query: &str) -> Result<Vec<Value>, AppError> {
        let url = self.endpoint("query");
        tracing::debug!("POST {} query={}", url, query);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&LakeQueryRequest { query })
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, e))?;

        let response = Self::check_status(&url, response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(&url, e))?;

        parse_query_body(&body)
    }

    async fn version(&self) -> Result<LakeVersion, AppError> {
        let url = self.endpoint("version");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, e))?;

        let response = Self::check_status(&url, response).await?;
        response
            .json::<LakeVersion>()
            .await
            .map_err(|e| AppError::InvalidResponse(format!("Failed to parse {}: {}", url, e)))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
