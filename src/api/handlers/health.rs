use axum::{extract::State, Json};

use crate::api::handlers::query::AppState;
use crate::models::HealthCheckResult;

/// Test the datasource: can the configured lake be reached?
pub async fn test_datasource(State(state): State<AppState>) -> Json<HealthCheckResult> {
    tracing::info!("Testing lake at {}", state.datasource.base_url());

    let result = state.datasource.health_check().await;
    if !result.ok {
        tracing::warn!("Lake health check failed: {}", result.message);
    }
    Json(result)
}
