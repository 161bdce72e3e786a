use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{AppError, ErrorDetail};
use crate::models::frame::DataFrame;
use crate::services::template::ScopedVars;

pub const DEFAULT_TIME_FIELD: &str = "ts";
pub const DEFAULT_QUERY_FRAGMENT: &str = "*";

/// One panel series: which pool to read, which field carries time, and what to pipe the data through
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRequest {
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub time_field: Option<String>,
    #[serde(default)]
    pub query_text: Option<String>,
}

impl SeriesRequest {
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            ..Default::default()
        }
    }

    pub fn with_pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    pub fn with_time_field(mut self, time_field: impl Into<String>) -> Self {
        self.time_field = Some(time_field.into());
        self
    }

    pub fn with_query_text(mut self, query_text: impl Into<String>) -> Self {
        self.query_text = Some(query_text.into());
        self
    }

    /// Pool name, treating blank input as absent
    pub fn pool_name(&self) -> Option<&str> {
        self.pool
            .as_deref()
            .map(str::trim)
            .filter(|pool| !pool.is_empty())
    }

    pub fn time_field_name(&self) -> &str {
        self.time_field
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .unwrap_or(DEFAULT_TIME_FIELD)
    }

    /// User fragment, passed through verbatim unless blank
    pub fn query_fragment(&self) -> &str {
        match self.query_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => DEFAULT_QUERY_FRAGMENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, AppError> {
        let range = Self { from, to };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.from >= self.to {
            return Err(AppError::Validation(format!(
                "Time range start {} must be before its end {}",
                self.from_iso(),
                self.to_iso()
            )));
        }
        Ok(())
    }

    pub fn from_iso(&self) -> String {
        engine_timestamp(&self.from)
    }

    pub fn to_iso(&self) -> String {
        engine_timestamp(&self.to)
    }
}

/// Timestamp literal the lake accepts, e.g. `2024-01-01T00:00:00.000Z`
pub fn engine_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One panel refresh as sent by the dashboard host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQueryRequest {
    pub range: TimeRange,
    pub targets: Vec<SeriesRequest>,
    #[serde(default)]
    pub scoped_vars: ScopedVars,
}

impl DataQueryRequest {
    pub fn new(range: TimeRange, targets: Vec<SeriesRequest>) -> Self {
        Self {
            range,
            targets,
            scoped_vars: ScopedVars::default(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.targets.is_empty() {
            return Err(AppError::Validation(
                "At least one query target is required".to_string(),
            ));
        }
        self.range.validate()
    }
}

/// Outcome of one series: a frame, or the diagnostic that stopped it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResult {
    pub ref_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<DataFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl SeriesResult {
    pub fn success(frame: DataFrame) -> Self {
        Self {
            ref_id: frame.ref_id.clone(),
            frame: Some(frame),
            error: None,
        }
    }

    pub fn failed(ref_id: impl Into<String>, error: &AppError) -> Self {
        Self {
            ref_id: ref_id.into(),
            frame: None,
            error: Some(error.to_detail()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DataQueryResponse {
    pub results: Vec<SeriesResult>,
}

impl DataQueryResponse {
    /// Frames of the series that succeeded, in request order
    pub fn frames(&self) -> impl Iterator<Item = &DataFrame> {
        self.results.iter().filter_map(|result| result.frame.as_ref())
    }

    pub fn get(&self, ref_id: &str) -> Option<&SeriesResult> {
        self.results.iter().find(|result| result.ref_id == ref_id)
    }
}

/// Result of the datasource health check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthCheckResult {
    pub ok: bool,
    pub message: String,
}

impl HealthCheckResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}
