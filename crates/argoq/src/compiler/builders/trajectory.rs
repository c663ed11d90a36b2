use crate::catalog::{BASE_COLUMNS, FACT_TABLE, FactColumn, SENSOR_COLUMNS};
use crate::compiler::assemble::{QueryText, admitted, column_list, dedupe, resolve_metrics};
use crate::compiler::plan::TrajectoryRequest;
use crate::models::DbContext;

use super::{float_predicate, scope_filter};

pub(super) fn build(request: &TrajectoryRequest, ctx: &DbContext) -> QueryText {
    let sensors = admitted(&SENSOR_COLUMNS, &ctx.existing_columns);
    let mut metrics = resolve_metrics(&request.metrics, &ctx.existing_columns)
        .into_iter()
        .filter(|column| sensors.contains(column))
        .collect::<Vec<_>>();
    if metrics.is_empty() {
        metrics = sensors;
    }
    let columns = dedupe(BASE_COLUMNS.into_iter().chain(metrics));

    let mut filter = scope_filter(&request.scope, ctx);
    filter.push(float_predicate(request.float_id));

    QueryText::finish(format!(
        "SELECT {} FROM {FACT_TABLE}{} ORDER BY {} ASC",
        column_list(&columns),
        filter.where_clause(),
        FactColumn::Timestamp.quoted()
    ))
}
