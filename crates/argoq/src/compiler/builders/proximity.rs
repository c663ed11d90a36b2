use crate::catalog::{BASE_COLUMNS, FACT_TABLE, FactColumn};
use crate::compiler::assemble::{Filter, QueryText, column_list, nan_safe, resolve_metrics};
use crate::compiler::plan::ProximityRequest;
use crate::compiler::ranking::{LatestPerEntity, RankFunction};
use crate::geo::{BoundingBox, distance_expr};
use crate::models::DbContext;

/// Nearest floats by their latest sample inside the search window.
///
/// Stages: time and bounding-box pre-filter, rank by recency per float, keep
/// rank 1, compute the exact distance, cut at the radius.
pub(super) fn build(request: &ProximityRequest, ctx: &DbContext) -> QueryText {
    let metrics = resolve_metrics(&request.metrics, &ctx.existing_columns)
        .into_iter()
        .filter(|column| !column.is_base())
        .collect::<Vec<_>>();

    let mut filter = Filter::new();
    filter.push(format!(
        "{} IS NOT NULL AND {} IS NOT NULL",
        FactColumn::Latitude.quoted(),
        FactColumn::Longitude.quoted()
    ));
    filter.push(
        ctx.time_resolver()
            .resolve(request.time_constraint.as_deref())
            .to_sql(),
    );
    filter.push(BoundingBox::around(request.origin, request.distance_km).to_sql());

    let raw_columns = BASE_COLUMNS
        .iter()
        .chain(metrics.iter())
        .copied()
        .collect::<Vec<_>>();
    let projection = column_list(&raw_columns);

    let mut rounded = vec![
        FactColumn::FloatId.quoted(),
        FactColumn::Timestamp.quoted(),
        round_as(FactColumn::Latitude.quoted(), FactColumn::Latitude, 4),
        round_as(FactColumn::Longitude.quoted(), FactColumn::Longitude, 4),
    ];
    rounded.extend(
        metrics
            .iter()
            .map(|column| round_as(nan_safe(*column), *column, 3)),
    );

    let ranked = LatestPerEntity::per_float(RankFunction::RowNumber).cte(
        "ranked_samples",
        &rounded.join(", "),
        "time_filtered",
        None,
    );

    let lines = [
        "WITH time_filtered AS (".to_string(),
        format!("    SELECT {projection}"),
        format!("    FROM {FACT_TABLE}"),
        format!("    WHERE {}", filter.conjunction().unwrap_or_default()),
        "),".to_string(),
        format!("{ranked},"),
        "latest_samples AS (".to_string(),
        format!("    SELECT {projection}"),
        "    FROM ranked_samples".to_string(),
        format!("    WHERE {}", LatestPerEntity::keep_latest()),
        "),".to_string(),
        "distances AS (".to_string(),
        format!(
            "    SELECT {projection}, {} AS distance_km",
            distance_expr(request.origin)
        ),
        "    FROM latest_samples".to_string(),
        ")".to_string(),
        format!("SELECT {projection}, distance_km"),
        "FROM distances".to_string(),
        format!("WHERE distance_km <= {}", request.distance_km),
        "ORDER BY distance_km ASC".to_string(),
        format!("LIMIT {}", request.limit),
    ];

    QueryText::finish(lines.join("\n"))
}

fn round_as(expression: String, alias: FactColumn, places: u8) -> String {
    format!("ROUND({expression}::numeric, {places}) AS {}", alias.quoted())
}
