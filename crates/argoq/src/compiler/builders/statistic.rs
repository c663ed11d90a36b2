use crate::catalog::{FACT_TABLE, FactColumn};
use crate::compiler::assemble::{QueryText, nan_safe, resolve_metrics};
use crate::compiler::plan::StatisticRequest;
use crate::models::{Aggregation, DbContext};

use super::scope_filter;

/// One aggregate row over the window. `count`, or a request with no usable
/// metric, counts distinct floats instead.
pub(super) fn build(request: &StatisticRequest, ctx: &DbContext) -> QueryText {
    let metrics = resolve_metrics(&request.metrics, &ctx.existing_columns)
        .into_iter()
        .filter(|column| !matches!(column, FactColumn::FloatId | FactColumn::Timestamp))
        .collect::<Vec<_>>();

    let select = if request.aggregation == Aggregation::Count || metrics.is_empty() {
        format!(
            "COUNT(DISTINCT {}) AS \"float_count\"",
            FactColumn::FloatId.quoted()
        )
    } else {
        let function = request.aggregation.sql_function();
        metrics
            .iter()
            .map(|column| format!("{function}({}) AS {}", nan_safe(*column), column.quoted()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    QueryText::finish(format!(
        "SELECT {select} FROM {FACT_TABLE}{}",
        scope_filter(&request.scope, ctx).where_clause()
    ))
}
