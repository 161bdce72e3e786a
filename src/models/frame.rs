// Table model handed back to the dashboard host
//
// A frame is built fresh for every series on every refresh and is never
// mutated once returned.

use serde::Serialize;
use serde_json::{Map, Value};

/// Label shown for a field whose name is the empty string
pub const EMPTY_KEY_LABEL: &str = "(empty string)";

/// A row as the lake returns it: field name to lake value
pub type RawRow = Map<String, Value>;

/// Display category of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    Time,
    Number,
    String,
    Boolean,
}

impl TypeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCategory::Time => "time",
            TypeCategory::Number => "number",
            TypeCategory::String => "string",
            TypeCategory::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Name shown to the user
    pub name: String,
    #[serde(rename = "type")]
    pub category: TypeCategory,
    /// Key used to read the value out of a raw row
    #[serde(skip)]
    pub key: String,
    /// Whether values are coerced to epoch milliseconds
    #[serde(skip)]
    pub is_time: bool,
}

impl Column {
    /// Column for a lake field, relabelling the empty-string key for display
    pub fn new(key: impl Into<String>, category: TypeCategory) -> Self {
        let key = key.into();
        let name = if key.is_empty() {
            EMPTY_KEY_LABEL.to_string()
        } else {
            key.clone()
        };
        Self {
            name,
            category,
            key,
            is_time: false,
        }
    }

    /// The series time column, always rendered as time
    pub fn time(key: impl Into<String>) -> Self {
        Self {
            is_time: true,
            ..Self::new(key, TypeCategory::Time)
        }
    }

    pub fn is_empty_key(&self) -> bool {
        self.key.is_empty()
    }
}

/// Ordered, name-unique column list; the time column, when present, comes first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }

    /// Add a column, keeping time columns leftmost. Returns false for duplicate names.
    pub fn insert(&mut self, column: Column) -> bool {
        if self.contains(&column.name) {
            return false;
        }
        if column.is_time {
            self.columns.insert(0, column);
        } else {
            self.columns.push(column);
        }
        true
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn time_column(&self) -> Option<&Column> {
        self.columns.first().filter(|column| column.is_time)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Output table of one series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrame {
    pub ref_id: String,
    pub columns: ColumnSchema,
    /// Tuples aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl DataFrame {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of the named column, top to bottom
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self
            .columns
            .columns()
            .iter()
            .position(|column| column.name == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}
