use crate::api::middleware::AppError;
use crate::models::RawRow;
use crate::services::lake::LakeTransport;
use serde_json::Value;

/// Runs the composed query and returns its records untouched
pub struct ResultFetcher<'a> {
    lake: &'a dyn LakeTransport,
}

impl<'a> ResultFetcher<'a> {
    pub fn new(lake: &'a dyn LakeTransport) -> Self {
        Self { lake }
    }

    pub async fn fetch(&self, final_query: &str) -> Result<Vec<RawRow>, AppError> {
        let values = self.lake.query(final_query).await?;
        let total = values.len();

        let rows: Vec<RawRow> = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect();

        if rows.len() < total {
            tracing::warn!(
                "Skipped {} non-record value(s) in query result",
                total - rows.len()
            );
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::lake::fake::ScriptedLake;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_runs_query_verbatim() {
        let lake = ScriptedLake::new(|_| Ok(vec![json!({"ts": "2024-01-01T00:00:00Z", "v": 1})]));
        let rows = ResultFetcher::new(&lake).fetch("from p | * | sort ts").await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["v"], json!(1));
        assert_eq!(lake.calls(), vec!["from p | * | sort ts".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_skips_non_records() {
        let lake = ScriptedLake::new(|_| Ok(vec![json!({"a": 1}), json!(5), json!("x")]));
        let rows = ResultFetcher::new(&lake).fetch("from p").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_propagates_transport_errors() {
        let lake = ScriptedLake::new(|_| {
            Err(AppError::Transport {
                url: "http://scripted-lake/query".to_string(),
                message: "connection reset".to_string(),
            })
        });
        let err = ResultFetcher::new(&lake).fetch("from p").await.unwrap_err();
        assert!(matches!(err, AppError::Transport { .. }));
    }
}
