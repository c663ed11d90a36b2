use crate::catalog::{BASE_COLUMNS, FACT_TABLE, FactColumn, SENSOR_COLUMNS};
use crate::compiler::assemble::{Filter, QueryText, column_list, dedupe, resolve_metrics};
use crate::compiler::plan::PathRequest;
use crate::models::DbContext;

use super::float_predicate;

/// Raw record stream, one float or all of them, oldest first.
pub(super) fn build(request: &PathRequest, ctx: &DbContext) -> QueryText {
    let sensors = resolve_metrics(&request.metrics, &ctx.existing_columns)
        .into_iter()
        .filter(|column| SENSOR_COLUMNS.contains(column));
    let columns = dedupe(BASE_COLUMNS.into_iter().chain(sensors));

    let mut filter = Filter::new();
    if let Some(float_id) = request.float_id {
        filter.push(float_predicate(float_id));
    }

    QueryText::finish(format!(
        "SELECT {} FROM {FACT_TABLE}{} ORDER BY {} ASC",
        column_list(&columns),
        filter.where_clause(),
        FactColumn::Timestamp.quoted()
    ))
}
