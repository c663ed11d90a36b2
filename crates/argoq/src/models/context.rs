use time::Date;

use crate::catalog::ColumnSet;
use crate::time_clause::TimeClauseResolver;
use crate::utils::time::today_utc;

/// What the compiler may assume about the fact table for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbContext {
    pub existing_columns: ColumnSet,
    pub max_known_date: Option<Date>,
    pub min_known_date: Option<Date>,
}

impl DbContext {
    #[must_use]
    pub fn new(existing_columns: ColumnSet) -> Self {
        Self {
            existing_columns,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_known_date(mut self, date: Date) -> Self {
        self.max_known_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_min_known_date(mut self, date: Date) -> Self {
        self.min_known_date = Some(date);
        self
    }

    /// Anchor for relative time phrases. The dataset usually lags real time,
    /// so the newest known sample wins over the wall clock.
    #[must_use]
    pub fn anchor_date(&self) -> Date {
        self.max_known_date.unwrap_or_else(today_utc)
    }

    #[must_use]
    pub fn time_resolver(&self) -> TimeClauseResolver {
        TimeClauseResolver::new(self.anchor_date()).with_floor(self.min_known_date)
    }
}
