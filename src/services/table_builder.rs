// Table building
//
// Turns raw lake records into frame rows aligned with the probed schema. Row
// order is kept as received; the composed query already sorts on the time field.

use crate::models::{Column, ColumnSchema, DataFrame, NullPolicy, RawRow, TypeCategory};
use chrono::{DateTime, NaiveDateTime};
use serde_json::{json, Value};

pub struct TableBuilder {
    null_policy: NullPolicy,
}

impl TableBuilder {
    pub fn new(null_policy: NullPolicy) -> Self {
        Self { null_policy }
    }

    pub fn build(&self, ref_id: &str, schema: ColumnSchema, rows: &[RawRow]) -> DataFrame {
        let rows = rows
            .iter()
            .map(|row| {
                schema
                    .columns()
                    .iter()
                    .map(|column| self.extract(column, row))
                    .collect()
            })
            .collect();

        DataFrame {
            ref_id: ref_id.to_string(),
            columns: schema,
            rows,
        }
    }

    fn extract(&self, column: &Column, row: &RawRow) -> Value {
        // `column.key` is the lake's own name, so the empty-string field is read
        // from "" and never from its display label.
        let value = row.get(&column.key).unwrap_or(&Value::Null);

        if column.is_time {
            return epoch_millis(value);
        }

        match (value, self.null_policy, column.category) {
            (Value::Null, NullPolicy::Zero, TypeCategory::Number) => json!(0),
            (value, _, _) => value.clone(),
        }
    }
}

/// Epoch milliseconds of a lake time value, or null when it is not a time
pub fn epoch_millis(value: &Value) -> Value {
    match value {
        Value::String(text) => parse_millis(text).map(Value::from).unwrap_or_else(|| {
            tracing::debug!("Unparsable time value {:?}", text);
            Value::Null
        }),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|ms| ms as i64))
            .map(Value::from)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn parse_millis(text: &str) -> Option<i64> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|ts| ts.and_utc().timestamp_millis())
}
