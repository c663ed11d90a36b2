use crate::catalog::{FACT_TABLE, FactColumn, SENSOR_COLUMNS};
use crate::compiler::assemble::{QueryText, admitted, column_list, dedupe, resolve_metrics};
use crate::compiler::plan::ProfileRequest;
use crate::compiler::ranking::{LatestPerEntity, RankFunction};
use crate::models::DbContext;

use super::{float_predicate, scope_filter};

const TRAILING_COLUMNS: [FactColumn; 5] = [
    FactColumn::Pressure,
    FactColumn::Latitude,
    FactColumn::Longitude,
    FactColumn::FloatId,
    FactColumn::Timestamp,
];

/// Every depth level recorded at the newest matching timestamp.
pub(super) fn build(request: &ProfileRequest, ctx: &DbContext) -> QueryText {
    let sensors = admitted(&SENSOR_COLUMNS, &ctx.existing_columns);
    let mut metrics = resolve_metrics(&request.metrics, &ctx.existing_columns)
        .into_iter()
        .filter(|column| sensors.contains(column))
        .collect::<Vec<_>>();
    if metrics.is_empty() {
        metrics = sensors;
    }
    let columns = dedupe(metrics.into_iter().chain(TRAILING_COLUMNS));
    let projection = column_list(&columns);

    let mut filter = scope_filter(&request.scope, ctx);
    let ranking = match request.float_id {
        Some(float_id) => {
            filter.push(float_predicate(float_id));
            LatestPerEntity::per_float(RankFunction::Rank)
        }
        None => LatestPerEntity::global(RankFunction::Rank),
    };
    let conjunction = filter.conjunction();

    let lines = [
        format!(
            "WITH {}",
            ranking.cte(
                "ranked_profile",
                &projection,
                FACT_TABLE,
                conjunction.as_deref()
            )
        ),
        format!("SELECT {projection}"),
        "FROM ranked_profile".to_string(),
        format!("WHERE {}", LatestPerEntity::keep_latest()),
        format!("ORDER BY {} ASC", FactColumn::Pressure.quoted()),
    ];
    QueryText::finish(lines.join("\n"))
}
