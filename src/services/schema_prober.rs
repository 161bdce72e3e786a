// Schema probing
//
// Before the data query runs, the prober asks the lake two questions about the
// composed query: how many record shapes it produces, and what the fields of
// its first record are. A series is only tabulated when there is exactly one
// shape, since every row of a frame shares one column set.

use crate::api::middleware::AppError;
use crate::models::{Column, ColumnSchema};
use crate::services::lake::LakeTransport;
use crate::services::query_composer::PIPE_SEPARATOR;
use crate::services::type_classifier::classify;
use serde_json::Value;

pub const SHAPE_CHECK_SUFFIX: &str = "by typeof(this) | count() | yield count";
pub const SCHEMA_SAMPLE_SUFFIX: &str =
    "head 1 | over this => (yield {key:key[0], type:typeof(value)})";
pub const POOL_DISCOVERY_QUERY: &str = "from :pools | yield name";

pub fn shape_check_query(final_query: &str) -> String {
    format!("{}{}{}", final_query, PIPE_SEPARATOR, SHAPE_CHECK_SUFFIX)
}

pub fn schema_sample_query(final_query: &str) -> String {
    format!("{}{}{}", final_query, PIPE_SEPARATOR, SCHEMA_SAMPLE_SUFFIX)
}

pub struct SchemaProber<'a> {
    lake: &'a dyn LakeTransport,
}

impl<'a> SchemaProber<'a> {
    pub fn new(lake: &'a dyn LakeTransport) -> Self {
        Self { lake }
    }

    /// Shape check followed by schema sampling
    pub async fn probe(&self, final_query: &str, time_field: &str) -> Result<ColumnSchema, AppError> {
        self.check_shape(final_query).await?;
        self.sample_schema(final_query, time_field).await
    }

    pub async fn check_shape(&self, final_query: &str) -> Result<(), AppError> {
        let values = self.lake.query(&shape_check_query(final_query)).await?;
        let shapes = parse_count(&values)?;
        tracing::debug!("Shape check found {} record shape(s)", shapes);

        match shapes {
            0 => Err(AppError::NoDataInRange),
            1 => Ok(()),
            shapes => Err(AppError::HeterogeneousShape { shapes }),
        }
    }

    pub async fn sample_schema(
        &self,
        final_query: &str,
        time_field: &str,
    ) -> Result<ColumnSchema, AppError> {
        let pairs = self.lake.query(&schema_sample_query(final_query)).await?;
        Ok(schema_from_sample(&pairs, time_field))
    }

    /// Names of every pool in the lake
    pub async fn discover_pools(&self) -> Result<Vec<String>, AppError> {
        let values = self.lake.query(POOL_DISCOVERY_QUERY).await?;
        Ok(values
            .iter()
            .filter_map(|value| match value {
                Value::String(name) => Some(name.clone()),
                Value::Object(record) => record
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect())
    }
}

/// Count yielded by the shape check; no output at all means no data
fn parse_count(values: &[Value]) -> Result<u64, AppError> {
    let Some(first) = values.first() else {
        return Ok(0);
    };

    let count = match first {
        Value::Object(record) => record.get("count").and_then(Value::as_u64),
        value => value.as_u64(),
    };

    count.ok_or_else(|| {
        AppError::InvalidResponse(format!("Expected a record count from shape check, got {}", first))
    })
}

/// Build the column schema from `{key, type}` sample pairs.
///
/// Unclassifiable types are dropped. The column named like the time field is
/// placed first whatever its position in the sample.
pub fn schema_from_sample(pairs: &[Value], time_field: &str) -> ColumnSchema {
    let mut schema = ColumnSchema::new();

    for pair in pairs {
        let Some(key) = pair.get("key").and_then(Value::as_str) else {
            tracing::warn!("Ignoring schema sample entry without a key: {}", pair);
            continue;
        };

        let tag = match pair.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let Some(category) = classify(&tag) else {
            tracing::debug!("Dropping field {:?} of unsupported type {}", key, tag);
            continue;
        };

        let column = Column::new(key, category);
        let column = if column.name == time_field {
            Column::time(key)
        } else {
            column
        };

        let name = column.name.clone();
        if !schema.insert(column) {
            tracing::warn!("Ignoring duplicate column {}", name);
        }
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TypeCategory, EMPTY_KEY_LABEL};
    use crate::services::lake::fake::{is_pool_discovery, is_shape_check, ScriptedLake};
    use serde_json::json;

    const QUERY: &str = "from default | ts > 2024-01-01T00:00:00.000Z and ts < 2024-01-02T00:00:00.000Z | * | sort ts";

    fn shape_lake(count: Value) -> ScriptedLake {
        ScriptedLake::new(move |query| {
            assert!(is_shape_check(query));
            Ok(vec![count.clone()])
        })
    }

    #[test]
    fn test_probe_queries() {
        assert_eq!(
            shape_check_query("from p | *"),
            "from p | * | by typeof(this) | count() | yield count"
        );
        assert_eq!(
            schema_sample_query("from p | *"),
            "from p | * | head 1 | over this => (yield {key:key[0], type:typeof(value)})"
        );
    }

    #[tokio::test]
    async fn test_shape_check_outcomes() {
        let lake = shape_lake(json!(0));
        assert!(matches!(
            SchemaProber::new(&lake).check_shape(QUERY).await,
            Err(AppError::NoDataInRange)
        ));

        let lake = shape_lake(json!(2));
        assert!(matches!(
            SchemaProber::new(&lake).check_shape(QUERY).await,
            Err(AppError::HeterogeneousShape { shapes: 2 })
        ));

        let lake = shape_lake(json!(1));
        tokio_test::assert_ok!(SchemaProber::new(&lake).check_shape(QUERY).await);

        let lake = shape_lake(json!({"count": 1}));
        tokio_test::assert_ok!(SchemaProber::new(&lake).check_shape(QUERY).await);
    }

    #[tokio::test]
    async fn test_shape_check_empty_output_is_no_data() {
        let lake = ScriptedLake::new(|_| Ok(vec![]));
        assert!(matches!(
            SchemaProber::new(&lake).check_shape(QUERY).await,
            Err(AppError::NoDataInRange)
        ));
    }

    #[tokio::test]
    async fn test_shape_check_garbage_is_invalid_response() {
        let lake = shape_lake(json!("many"));
        assert!(matches!(
            SchemaProber::new(&lake).check_shape(QUERY).await,
            Err(AppError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_heterogeneous_shape_skips_sampling() {
        let lake = ScriptedLake::new(|query| {
            if is_shape_check(query) {
                Ok(vec![json!(3)])
            } else {
                Ok(vec![json!({"key": "ts", "type": "<time>"})])
            }
        });

        let result = SchemaProber::new(&lake).probe(QUERY, "ts").await;
        assert!(matches!(result, Err(AppError::HeterogeneousShape { shapes: 3 })));
        assert_eq!(lake.calls().len(), 1);
    }

    #[test]
    fn test_time_column_moves_first() {
        let pairs = vec![
            json!({"key": "host", "type": "<string>"}),
            json!({"key": "bytes", "type": "<uint64>"}),
            json!({"key": "ts", "type": "<time>"}),
            json!({"key": "ok", "type": "<bool>"}),
        ];
        let schema = schema_from_sample(&pairs, "ts");

        assert_eq!(schema.names(), vec!["ts", "host", "bytes", "ok"]);
        assert_eq!(schema.columns()[0].category, TypeCategory::Time);
        assert!(schema.columns()[0].is_time);
        assert_eq!(schema.columns()[2].category, TypeCategory::Number);
        assert_eq!(schema.columns()[3].category, TypeCategory::Boolean);
    }

    #[test]
    fn test_time_field_with_string_type_is_still_time() {
        let pairs = vec![
            json!({"key": "value", "type": "float64"}),
            json!({"key": "when", "type": "string"}),
        ];
        let schema = schema_from_sample(&pairs, "when");
        assert_eq!(schema.names(), vec!["when", "value"]);
        assert_eq!(schema.columns()[0].category, TypeCategory::Time);
    }

    #[test]
    fn test_other_time_columns_keep_order() {
        let pairs = vec![
            json!({"key": "created", "type": "<time>"}),
            json!({"key": "ts", "type": "<time>"}),
        ];
        let schema = schema_from_sample(&pairs, "ts");
        assert_eq!(schema.names(), vec!["ts", "created"]);
        assert!(!schema.columns()[1].is_time);
    }

    #[test]
    fn test_empty_key_relabelled_but_read_from_empty_key() {
        let pairs = vec![
            json!({"key": "ts", "type": "<time>"}),
            json!({"key": "", "type": "<int64>"}),
        ];
        let schema = schema_from_sample(&pairs, "ts");
        let column = &schema.columns()[1];
        assert_eq!(column.name, EMPTY_KEY_LABEL);
        assert_eq!(column.key, "");
    }

    #[test]
    fn test_unclassified_columns_dropped() {
        let pairs = vec![
            json!({"key": "ts", "type": "<time>"}),
            json!({"key": "tags", "type": "<[string]>"}),
            json!({"key": "meta", "type": "<{a:int64}>"}),
            json!({"key": "nothing", "type": "<null>"}),
            json!({"type": "<int64>"}),
            json!({"key": "n", "type": "<int32>"}),
        ];
        let schema = schema_from_sample(&pairs, "ts");
        assert_eq!(schema.names(), vec!["ts", "n"]);
    }

    #[test]
    fn test_schema_without_time_field() {
        let pairs = vec![json!({"key": "count", "type": "<uint64>"})];
        let schema = schema_from_sample(&pairs, "ts");
        assert_eq!(schema.names(), vec!["count"]);
        assert!(schema.time_column().is_none());
    }

    #[tokio::test]
    async fn test_discover_pools() {
        let lake = ScriptedLake::new(|query| {
            assert!(is_pool_discovery(query));
            Ok(vec![json!("logs"), json!({"name": "metrics"}), json!(7)])
        });
        let pools = SchemaProber::new(&lake).discover_pools().await.unwrap();
        assert_eq!(pools, vec!["logs".to_string(), "metrics".to_string()]);
    }
}
