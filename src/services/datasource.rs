// Datasource orchestration
//
// For every series of a refresh: compose the query, probe its schema, fetch
// the rows and build the frame. Series run concurrently and independently; a
// failing series yields a diagnostic result next to its siblings' frames.

use crate::api::middleware::AppError;
use crate::models::{
    DataFrame, DataQueryRequest, DataQueryResponse, HealthCheckResult, NullPolicy, SeriesRequest,
    SeriesResult, TimeRange,
};
use crate::services::lake::LakeTransport;
use crate::services::query_composer::QueryComposer;
use crate::services::result_fetcher::ResultFetcher;
use crate::services::schema_prober::SchemaProber;
use crate::services::table_builder::TableBuilder;
use crate::services::template::{ScopedVars, TemplateSrv};
use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct DataSourceOptions {
    pub null_policy: NullPolicy,
}

pub struct LakeDataSource {
    lake: Arc<dyn LakeTransport>,
    templates: Arc<dyn TemplateSrv>,
    options: DataSourceOptions,
}

impl LakeDataSource {
    pub fn new(
        lake: Arc<dyn LakeTransport>,
        templates: Arc<dyn TemplateSrv>,
        options: DataSourceOptions,
    ) -> Self {
        Self {
            lake,
            templates,
            options,
        }
    }

    pub fn base_url(&self) -> &str {
        self.lake.base_url()
    }

    /// Run every series of a refresh concurrently. Results keep request order.
    pub async fn query(&self, request: &DataQueryRequest) -> DataQueryResponse {
        let request_id = Uuid::new_v4();
        tracing::info!(
            "Refresh {}: {} series against {}",
            request_id,
            request.targets.len(),
            self.lake.base_url()
        );

        let pipelines = request
            .targets
            .iter()
            .map(|series| self.run_series(series, &request.range, &request.scoped_vars));
        let results = join_all(pipelines).await;

        let failed = results.iter().filter(|result| !result.is_success()).count();
        tracing::info!(
            "Refresh {} finished: {} ok, {} failed",
            request_id,
            results.len() - failed,
            failed
        );

        DataQueryResponse { results }
    }

    async fn run_series(
        &self,
        series: &SeriesRequest,
        range: &TimeRange,
        scoped_vars: &ScopedVars,
    ) -> SeriesResult {
        match self.series_frame(series, range, scoped_vars).await {
            Ok(frame) => SeriesResult::success(frame),
            Err(AppError::NoDataInRange) => {
                tracing::info!("Series {}: no data in range", series.ref_id);
                SeriesResult::failed(&series.ref_id, &AppError::NoDataInRange)
            }
            Err(e) => {
                tracing::warn!("Series {} failed: {}", series.ref_id, e);
                SeriesResult::failed(&series.ref_id, &e)
            }
        }
    }

    /// Pipeline of one series: compose, probe, fetch, build
    pub async fn series_frame(
        &self,
        series: &SeriesRequest,
        range: &TimeRange,
        scoped_vars: &ScopedVars,
    ) -> Result<DataFrame, AppError> {
        let composed =
            match QueryComposer::compose(series, range, scoped_vars, self.templates.as_ref()) {
                Ok(composed) => composed,
                Err(AppError::MissingPool) => return Err(self.pool_required().await),
                Err(e) => return Err(e),
            };
        let final_query = composed.text();
        tracing::info!("Series {} query: {}", series.ref_id, final_query);

        let schema = SchemaProber::new(self.lake.as_ref())
            .probe(&final_query, &composed.time_field)
            .await?;
        tracing::debug!("Series {} columns: {:?}", series.ref_id, schema.names());

        let rows = ResultFetcher::new(self.lake.as_ref())
            .fetch(&final_query)
            .await?;

        let frame = TableBuilder::new(self.options.null_policy).build(&series.ref_id, schema, &rows);
        tracing::debug!("Series {}: {} row(s)", series.ref_id, frame.row_count());
        Ok(frame)
    }

    /// Diagnostic for a series without a pool, listing the pools it could use
    async fn pool_required(&self) -> AppError {
        match SchemaProber::new(self.lake.as_ref()).discover_pools().await {
            Ok(available) => AppError::PoolRequired { available },
            Err(e) => {
                tracing::warn!("Pool discovery failed: {}", e);
                e
            }
        }
    }

    /// Check that the lake answers on its version endpoint. Never fails.
    pub async fn health_check(&self) -> HealthCheckResult {
        match self.lake.version().await {
            Ok(version) => {
                HealthCheckResult::success(format!("Success - Zed lake version {}", version.version))
            }
            Err(AppError::HttpStatus { status, .. }) => {
                HealthCheckResult::failure(format!("Failure - HTTP status code {}", status))
            }
            Err(AppError::InvalidResponse(message)) => HealthCheckResult::failure(format!(
                "Failure - Unexpected response from Zed lake at {}: {}",
                self.lake.endpoint("version"),
                message
            )),
            Err(e) => {
                tracing::debug!("Health check failed: {}", e);
                HealthCheckResult::failure(format!(
                    "Failure - Could not contact Zed lake at {}",
                    self.lake.endpoint("version")
                ))
            }
        }
    }
}
