use crate::catalog::{FACT_TABLE, FactColumn};
use crate::compiler::assemble::{QueryText, admitted, nan_safe, resolve_metrics};
use crate::compiler::plan::TimeSeriesRequest;
use crate::models::DbContext;

use super::scope_filter;

const DEFAULT_METRICS: [FactColumn; 6] = [
    FactColumn::Temperature,
    FactColumn::Salinity,
    FactColumn::DissolvedOxygen,
    FactColumn::Chlorophyll,
    FactColumn::Ph,
    FactColumn::Pressure,
];

pub(super) fn build(request: &TimeSeriesRequest, ctx: &DbContext) -> QueryText {
    let mut metrics = resolve_metrics(&request.metrics, &ctx.existing_columns)
        .into_iter()
        .filter(|column| !column.is_base())
        .collect::<Vec<_>>();
    if metrics.is_empty() {
        metrics = admitted(&DEFAULT_METRICS, &ctx.existing_columns);
    }

    let mut select = vec![
        format!("DATE_TRUNC('day', {}) AS day", FactColumn::Timestamp.quoted()),
        average(FactColumn::Latitude.quoted(), FactColumn::Latitude),
        average(FactColumn::Longitude.quoted(), FactColumn::Longitude),
    ];
    select.extend(
        metrics
            .iter()
            .map(|column| average(nan_safe(*column), *column)),
    );
    if metrics.is_empty() {
        select.push(format!("COUNT({}) AS \"count\"", FactColumn::FloatId.quoted()));
    }

    QueryText::finish(format!(
        "SELECT {} FROM {FACT_TABLE}{} GROUP BY day ORDER BY day ASC LIMIT {}",
        select.join(", "),
        scope_filter(&request.scope, ctx).where_clause(),
        request.limit
    ))
}

fn average(expression: String, alias: FactColumn) -> String {
    format!("AVG({expression}) AS {}", alias.quoted())
}
