use crate::catalog::{FACT_TABLE, FactColumn, SENSOR_COLUMNS};
use crate::compiler::assemble::{QueryText, admitted, column_list, dedupe, resolve_metrics};
use crate::compiler::plan::ScatterRequest;
use crate::models::DbContext;

use super::scope_filter;

const CANONICAL_PAIR: [FactColumn; 2] = [FactColumn::Temperature, FactColumn::Salinity];

pub(super) fn build(request: &ScatterRequest, ctx: &DbContext) -> QueryText {
    let mut metrics = resolve_metrics(&request.metrics, &ctx.existing_columns)
        .into_iter()
        .filter(|column| !column.is_base())
        .collect::<Vec<_>>();
    if metrics.len() < 2 {
        metrics = dedupe(
            admitted(&CANONICAL_PAIR, &ctx.existing_columns)
                .into_iter()
                .chain(admitted(&SENSOR_COLUMNS, &ctx.existing_columns)),
        );
        metrics.truncate(2);
    }

    let mut filter = scope_filter(&request.scope, ctx);
    for column in &metrics {
        filter.push(format!("{} IS NOT NULL", column.quoted()));
    }

    QueryText::finish(format!(
        "SELECT {} FROM {FACT_TABLE}{} LIMIT {}",
        column_list(&metrics),
        filter.where_clause(),
        request.limit
    ))
}
