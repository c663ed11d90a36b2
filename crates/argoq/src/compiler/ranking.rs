//! The "latest sample per entity" common table expression shared by the
//! proximity and profile builders.

use crate::catalog::FactColumn;

pub(crate) const RANK_ALIAS: &str = "ts_rank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RankFunction {
    /// One row per partition.
    RowNumber,
    /// Every row sharing the newest timestamp, e.g. all pressure levels of a
    /// profile.
    Rank,
}

impl RankFunction {
    const fn sql(self) -> &'static str {
        match self {
            Self::RowNumber => "ROW_NUMBER()",
            Self::Rank => "RANK()",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LatestPerEntity {
    pub function: RankFunction,
    /// Partition by `float_id`; otherwise the rank is global.
    pub partitioned: bool,
}

impl LatestPerEntity {
    pub(crate) const fn per_float(function: RankFunction) -> Self {
        Self {
            function,
            partitioned: true,
        }
    }

    pub(crate) const fn global(function: RankFunction) -> Self {
        Self {
            function,
            partitioned: false,
        }
    }

    pub(crate) fn window(&self) -> String {
        let partition = if self.partitioned {
            format!("PARTITION BY {} ", FactColumn::FloatId.quoted())
        } else {
            String::new()
        };
        format!(
            "{} OVER ({partition}ORDER BY {} DESC)",
            self.function.sql(),
            FactColumn::Timestamp.quoted()
        )
    }

    /// Renders `name AS (SELECT projection, <window> AS ts_rank FROM source
    /// [WHERE predicate])`. Consumers keep rows with `ts_rank = 1`.
    pub(crate) fn cte(
        &self,
        name: &str,
        projection: &str,
        source: &str,
        predicate: Option<&str>,
    ) -> String {
        let mut lines = vec![
            format!("{name} AS ("),
            format!(
                "    SELECT {projection}, {} AS {RANK_ALIAS}",
                self.window()
            ),
            format!("    FROM {source}"),
        ];
        if let Some(predicate) = predicate {
            lines.push(format!("    WHERE {predicate}"));
        }
        lines.push(")".to_string());
        lines.join("\n")
    }

    pub(crate) fn keep_latest() -> String {
        format!("{RANK_ALIAS} = 1")
    }
}
