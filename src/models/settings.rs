use serde::{Deserialize, Serialize};

pub const DEFAULT_LAKE_URL: &str = "http://localhost:9867";

/// Options configured for each datasource instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSourceSettings {
    #[serde(default)]
    pub url: Option<String>,
}

impl DataSourceSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    /// Configured lake URL, or the local default when unset
    pub fn base_url(&self) -> &str {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_LAKE_URL)
    }
}

/// What to render when a lake value is null or missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Keep nulls so the panel shows a gap
    #[default]
    Preserve,
    /// Render nulls in number columns as zero
    Zero,
}
