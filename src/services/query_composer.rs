// Query composition
//
// A series query is an ordered list of clauses joined by the lake's pipe
// operator. Each clause comes from its own function so the places where user
// input is interpolated stay few and reviewable.

use crate::api::middleware::AppError;
use crate::models::{SeriesRequest, TimeRange};
use crate::services::template::{ScopedVars, TemplateSrv, VariableFormat};
use crate::validation::IdentifierValidator;

pub const PIPE_SEPARATOR: &str = " | ";

/// Clauses of a lake query, rendered in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseList {
    clauses: Vec<String>,
}

impl ClauseList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, clause: impl Into<String>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn render(&self) -> String {
        self.clauses.join(PIPE_SEPARATOR)
    }
}

pub fn source_clause(pool: &str) -> String {
    format!("from {}", pool)
}

/// Exclusive on both ends so adjacent refreshes never share an edge row
pub fn range_clause(time_field: &str, range: &TimeRange) -> String {
    format!(
        "{field} > {from} and {field} < {to}",
        field = time_field,
        from = range.from_iso(),
        to = range.to_iso()
    )
}

pub fn sort_clause(time_field: &str) -> String {
    format!("sort {}", time_field)
}

/// Clauses of a series query plus the time field they filter and sort on
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    pub clauses: ClauseList,
    pub time_field: String,
}

impl ComposedQuery {
    /// Query text sent to the lake
    pub fn text(&self) -> String {
        self.clauses.render()
    }
}

pub struct QueryComposer;

impl QueryComposer {
    /// Compose a series query with dashboard variables substituted.
    ///
    /// Pool and time field are substituted first and validated as resolved, so
    /// a variable value cannot add a clause to the query.
    pub fn compose(
        series: &SeriesRequest,
        range: &TimeRange,
        scoped_vars: &ScopedVars,
        templates: &dyn TemplateSrv,
    ) -> Result<ComposedQuery, AppError> {
        let pool = series.pool_name().ok_or(AppError::MissingPool)?;
        let substitute = |text: &str| templates.replace(text, scoped_vars, VariableFormat::Csv);

        let pool = substitute(pool);
        let time_field = substitute(series.time_field_name());
        IdentifierValidator::validate_pool(&pool)?;
        IdentifierValidator::validate_field(&time_field)?;

        let clauses = ClauseList::new()
            .push(source_clause(&pool))
            .push(range_clause(&time_field, range))
            .push(substitute(series.query_fragment()))
            .push(sort_clause(&time_field));

        Ok(ComposedQuery {
            clauses,
            time_field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::template::ScopedVarsTemplateSrv;
    use chrono::{TimeZone, Utc};

    fn day_range() -> TimeRange {
        TimeRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn compose(series: &SeriesRequest, vars: &ScopedVars) -> Result<ComposedQuery, AppError> {
        QueryComposer::compose(series, &day_range(), vars, &ScopedVarsTemplateSrv::new())
    }

    #[test]
    fn test_compose_default_series() {
        let series = SeriesRequest::new("A")
            .with_pool("default")
            .with_time_field("ts")
            .with_query_text("*");

        let query = compose(&series, &ScopedVars::new()).unwrap();
        assert_eq!(
            query.clauses.clauses(),
            &[
                "from default".to_string(),
                "ts > 2024-01-01T00:00:00.000Z and ts < 2024-01-02T00:00:00.000Z".to_string(),
                "*".to_string(),
                "sort ts".to_string(),
            ]
        );
        assert_eq!(
            query.text(),
            "from default | ts > 2024-01-01T00:00:00.000Z and ts < 2024-01-02T00:00:00.000Z | * | sort ts"
        );
        assert_eq!(query.time_field, "ts");
    }

    #[test]
    fn test_compose_applies_defaults() {
        let series = SeriesRequest::new("A").with_pool("logs");
        let query = compose(&series, &ScopedVars::new()).unwrap().text();
        assert!(query.starts_with("from logs | ts > "));
        assert!(query.ends_with(" | * | sort ts"));
    }

    #[test]
    fn test_compose_substitutes_variables_as_csv() {
        let series = SeriesRequest::new("A")
            .with_pool("$pool")
            .with_time_field("when")
            .with_query_text("host in [${hosts}]");
        let mut vars = ScopedVars::new();
        vars.insert("pool".to_string(), "web".into());
        vars.insert("hosts".to_string(), vec!["\"a\"", "\"b\""].into());

        let query = compose(&series, &vars).unwrap().text();
        assert!(query.starts_with("from web | when > "));
        assert!(query.contains(" | host in [\"a\",\"b\"] | sort when"));
    }

    #[test]
    fn test_templated_time_field_is_resolved() {
        let series = SeriesRequest::new("A").with_pool("logs").with_time_field("$tf");
        let mut vars = ScopedVars::new();
        vars.insert("tf".to_string(), "when".into());

        let query = compose(&series, &vars).unwrap();
        assert_eq!(query.time_field, "when");
        assert_eq!(
            query.clauses.clauses()[1],
            "when > 2024-01-01T00:00:00.000Z and when < 2024-01-02T00:00:00.000Z"
        );
        assert_eq!(query.clauses.clauses()[3], "sort when");
    }

    #[test]
    fn test_missing_pool_is_signalled() {
        let result = compose(&SeriesRequest::new("A"), &ScopedVars::new());
        assert!(matches!(result, Err(AppError::MissingPool)));
    }

    #[test]
    fn test_unsafe_identifiers_rejected() {
        let series = SeriesRequest::new("A").with_pool("logs | drop secret");
        assert!(matches!(
            compose(&series, &ScopedVars::new()),
            Err(AppError::Validation(_))
        ));

        let series = SeriesRequest::new("A")
            .with_pool("logs")
            .with_time_field("ts or true");
        assert!(matches!(
            compose(&series, &ScopedVars::new()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unsafe_variable_values_rejected() {
        let mut vars = ScopedVars::new();
        vars.insert("pool".to_string(), "logs | drop secret | yield 1".into());
        vars.insert("tf".to_string(), "ts > 0 or true".into());
        vars.insert("pools".to_string(), vec!["a", "b"].into());

        let series = SeriesRequest::new("A").with_pool("$pool");
        assert!(matches!(compose(&series, &vars), Err(AppError::Validation(_))));

        let series = SeriesRequest::new("A").with_pool("logs").with_time_field("${tf}");
        assert!(matches!(compose(&series, &vars), Err(AppError::Validation(_))));

        // Multi-valued pools render as "a,b", which is not one pool
        let series = SeriesRequest::new("A").with_pool("$pools");
        assert!(matches!(compose(&series, &vars), Err(AppError::Validation(_))));
    }
}
