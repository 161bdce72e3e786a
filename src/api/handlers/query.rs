use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::middleware::AppError;
use crate::config::Config;
use crate::models::{DataQueryRequest, DataQueryResponse};
use crate::services::{DataSourceOptions, HttpLakeClient, LakeDataSource, ScopedVarsTemplateSrv};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub datasource: Arc<LakeDataSource>,
}

impl AppState {
    /// Wire the datasource to the lake named in the configuration
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let lake = HttpLakeClient::new(&config.datasource_settings(), config.lake_timeout())?;
        let datasource = LakeDataSource::new(
            Arc::new(lake),
            Arc::new(ScopedVarsTemplateSrv::new()),
            DataSourceOptions {
                null_policy: config.query.null_policy,
            },
        );

        Ok(Self {
            datasource: Arc::new(datasource),
        })
    }
}

/// Run one panel refresh; per-series failures are reported inside the response
pub async fn execute_query(
    State(state): State<AppState>,
    Json(payload): Json<DataQueryRequest>,
) -> Result<Json<DataQueryResponse>, AppError> {
    payload.validate()?;

    tracing::info!(
        "Executing {} series from {} to {}",
        payload.targets.len(),
        payload.range.from_iso(),
        payload.range.to_iso()
    );

    let response = state.datasource.query(&payload).await;
    Ok(Json(response))
}
