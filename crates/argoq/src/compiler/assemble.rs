use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::catalog::{ColumnSet, FactColumn};

/// A single, terminated, read-only statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QueryText(String);

impl QueryText {
    pub(crate) fn finish(body: impl Into<String>) -> Self {
        let mut text = body.into().trim_end().to_string();
        if !text.ends_with(';') {
            text.push(';');
        }
        Self(text)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for QueryText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueryText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub(crate) fn column_list(columns: &[FactColumn]) -> String {
    columns
        .iter()
        .map(|column| column.quoted())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keeps the first occurrence of each column.
pub(crate) fn dedupe(columns: impl IntoIterator<Item = FactColumn>) -> Vec<FactColumn> {
    let mut seen = Vec::new();
    for column in columns {
        if !seen.contains(&column) {
            seen.push(column);
        }
    }
    seen
}

/// Requested metric names mapped onto the allow-list and filtered by what the
/// table carries. Unknown or absent names are dropped silently.
pub(crate) fn resolve_metrics(names: &[String], columns: &ColumnSet) -> Vec<FactColumn> {
    let resolved = dedupe(names.iter().filter_map(|name| FactColumn::parse(name)));
    let (kept, dropped): (Vec<_>, Vec<_>) = resolved
        .into_iter()
        .partition(|column| columns.admits(*column));
    if !dropped.is_empty() {
        tracing::debug!(
            dropped = ?dropped.iter().map(|column| column.as_str()).collect::<Vec<_>>(),
            "dropping metrics absent from the fact table"
        );
    }
    kept
}

pub(crate) fn admitted(defaults: &[FactColumn], columns: &ColumnSet) -> Vec<FactColumn> {
    defaults
        .iter()
        .copied()
        .filter(|column| columns.admits(*column))
        .collect()
}

/// Sensor columns may hold the float sentinel `'NaN'`, which would poison
/// aggregates.
pub(crate) fn nan_safe(column: FactColumn) -> String {
    format!("NULLIF({}, 'NaN')", column.quoted())
}

/// Conjunction of predicates; tautologies are skipped.
#[derive(Debug, Default)]
pub(crate) struct Filter {
    predicates: Vec<Predicate>,
}

#[derive(Debug)]
struct Predicate {
    sql: String,
    grouped: bool,
}

impl Filter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, predicate: impl Into<String>) {
        self.insert(predicate.into(), false);
    }

    /// Caller-supplied text: always parenthesised once joined with anything else.
    pub(crate) fn push_grouped(&mut self, predicate: impl Into<String>) {
        self.insert(predicate.into(), true);
    }

    fn insert(&mut self, predicate: String, grouped: bool) {
        let trimmed = predicate.trim();
        if trimmed.is_empty() || trimmed == "1=1" {
            return;
        }
        self.predicates.push(Predicate {
            sql: trimmed.to_string(),
            grouped,
        });
    }

    pub(crate) fn conjunction(&self) -> Option<String> {
        if self.predicates.is_empty() {
            return None;
        }
        let joined = self.predicates.len() > 1;
        let rendered = self
            .predicates
            .iter()
            .map(|predicate| {
                if joined && (predicate.grouped || has_disjunction(&predicate.sql)) {
                    format!("({})", predicate.sql)
                } else {
                    predicate.sql.clone()
                }
            })
            .collect::<Vec<_>>();
        Some(rendered.join(" AND "))
    }

    /// `" WHERE a AND b"` or an empty string.
    pub(crate) fn where_clause(&self) -> String {
        self.conjunction()
            .map(|conjunction| format!(" WHERE {conjunction}"))
            .unwrap_or_default()
    }
}

/// True when `OR` appears as a bare word in any letter case.
fn has_disjunction(predicate: &str) -> bool {
    predicate
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .any(|token| token.eq_ignore_ascii_case("or"))
}

#[cfg(test)]
mod tests {
    use super::{Filter, QueryText, dedupe, resolve_metrics};
    use crate::catalog::{ColumnSet, FactColumn};

    #[test]
    fn finish_terminates_exactly_once() {
        assert_eq!(QueryText::finish("SELECT 1").as_str(), "SELECT 1;");
        assert_eq!(QueryText::finish("SELECT 1;\n").as_str(), "SELECT 1;");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let columns = dedupe([
            FactColumn::Salinity,
            FactColumn::Temperature,
            FactColumn::Salinity,
        ]);
        assert_eq!(columns, vec![FactColumn::Salinity, FactColumn::Temperature]);
    }

    #[test]
    fn metrics_are_filtered_by_the_table_schema() {
        let columns = ColumnSet::from_names(["float_id", "temperature"]);
        let metrics = [
            "Temperature".to_string(),
            "chlorophyll".to_string(),
            "pressure".to_string(),
            "\"; DROP TABLE argo_data".to_string(),
        ];
        assert_eq!(
            resolve_metrics(&metrics, &columns),
            vec![FactColumn::Temperature, FactColumn::Pressure]
        );
    }

    #[test]
    fn filter_wraps_disjunctions_inside_conjunctions() {
        let mut filter = Filter::new();
        filter.push("1=1");
        assert_eq!(filter.where_clause(), "");

        filter.push("\"longitude\" >= 170 OR \"longitude\" <= -170");
        filter.push("\"float_id\" = 7");
        assert_eq!(
            filter.where_clause(),
            " WHERE (\"longitude\" >= 170 OR \"longitude\" <= -170) AND \"float_id\" = 7"
        );
    }

    #[test]
    fn disjunctions_are_detected_in_any_case_and_spacing() {
        let mut filter = Filter::new();
        filter.push("\"latitude\" > 60\n\tor \"latitude\" < -60");
        filter.push("\"float_id\" = 7");
        assert_eq!(
            filter.where_clause(),
            " WHERE (\"latitude\" > 60\n\tor \"latitude\" < -60) AND \"float_id\" = 7"
        );

        let mut lone = Filter::new();
        lone.push("\"sensor_origin\" = 'north'");
        lone.push("\"float_id\" = 7");
        assert_eq!(
            lone.where_clause(),
            " WHERE \"sensor_origin\" = 'north' AND \"float_id\" = 7"
        );
    }

    #[test]
    fn grouped_predicates_are_wrapped_only_when_joined() {
        let mut single = Filter::new();
        single.push_grouped("\"latitude\" BETWEEN 5 AND 22");
        assert_eq!(single.where_clause(), " WHERE \"latitude\" BETWEEN 5 AND 22");

        single.push("\"float_id\" = 7");
        assert_eq!(
            single.where_clause(),
            " WHERE (\"latitude\" BETWEEN 5 AND 22) AND \"float_id\" = 7"
        );
    }
}
