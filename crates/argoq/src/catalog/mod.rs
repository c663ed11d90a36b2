//! Fact-table column allow-list and schema introspection.
//!
//! Every identifier the compiler renders comes from [`FactColumn`]; what the
//! live table currently carries is described by a [`ColumnSet`] obtained
//! through a [`ColumnCatalog`].

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::models::DbContext;

pub mod sqlite;

pub use sqlite::{POSTGRES_COLUMNS_SQL, SqliteCatalog};

pub const FACT_TABLE: &str = "argo_data";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FactColumn {
    FloatId,
    Timestamp,
    Latitude,
    Longitude,
    Pressure,
    Temperature,
    Salinity,
    DissolvedOxygen,
    Chlorophyll,
    Nitrate,
    Ph,
}

pub const ALL_COLUMNS: [FactColumn; 11] = [
    FactColumn::FloatId,
    FactColumn::Timestamp,
    FactColumn::Latitude,
    FactColumn::Longitude,
    FactColumn::Pressure,
    FactColumn::Temperature,
    FactColumn::Salinity,
    FactColumn::DissolvedOxygen,
    FactColumn::Chlorophyll,
    FactColumn::Nitrate,
    FactColumn::Ph,
];

/// Position columns projected ahead of sensor readings.
pub const BASE_COLUMNS: [FactColumn; 4] = [
    FactColumn::FloatId,
    FactColumn::Timestamp,
    FactColumn::Latitude,
    FactColumn::Longitude,
];

/// Full sensor list used by profile, trajectory and path projections.
pub const SENSOR_COLUMNS: [FactColumn; 7] = [
    FactColumn::Temperature,
    FactColumn::Salinity,
    FactColumn::DissolvedOxygen,
    FactColumn::Chlorophyll,
    FactColumn::Nitrate,
    FactColumn::Ph,
    FactColumn::Pressure,
];

impl FactColumn {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FloatId => "float_id",
            Self::Timestamp => "timestamp",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::Salinity => "salinity",
            Self::DissolvedOxygen => "dissolved_oxygen",
            Self::Chlorophyll => "chlorophyll",
            Self::Nitrate => "nitrate",
            Self::Ph => "ph",
        }
    }

    /// Case-insensitive lookup; anything outside the allow-list is `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        ALL_COLUMNS
            .into_iter()
            .find(|column| column.as_str() == normalized)
    }

    /// Identifier and position columns. They form the table's uniqueness key
    /// and are assumed present regardless of what introspection reports.
    #[must_use]
    pub const fn is_core(self) -> bool {
        matches!(
            self,
            Self::FloatId | Self::Timestamp | Self::Latitude | Self::Longitude | Self::Pressure
        )
    }

    #[must_use]
    pub const fn is_base(self) -> bool {
        matches!(
            self,
            Self::FloatId | Self::Timestamp | Self::Latitude | Self::Longitude
        )
    }

    #[must_use]
    pub fn quoted(self) -> String {
        format!("\"{}\"", self.as_str())
    }
}

impl Display for FactColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns currently present in the fact table.
///
/// An empty set means "unknown" and admits everything, so a failed or skipped
/// introspection degrades to each builder's full default column list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: BTreeSet<FactColumn>,
}

impl ColumnSet {
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Builds a set from raw column names; names outside the allow-list are
    /// ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: names
                .into_iter()
                .filter_map(|name| FactColumn::parse(name.as_ref()))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn contains(&self, column: FactColumn) -> bool {
        self.columns.contains(&column)
    }

    #[must_use]
    pub fn admits(&self, column: FactColumn) -> bool {
        column.is_core() || self.columns.is_empty() || self.columns.contains(&column)
    }

    pub fn iter(&self) -> impl Iterator<Item = FactColumn> + '_ {
        self.columns.iter().copied()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(FactColumn::as_str).collect()
    }
}

impl FromIterator<FactColumn> for ColumnSet {
    fn from_iter<T: IntoIterator<Item = FactColumn>>(iter: T) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

pub trait ColumnCatalog {
    fn existing_columns(&self) -> Result<ColumnSet>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
    pub min: Option<Date>,
    pub max: Option<Date>,
}

pub trait DataBounds {
    fn date_bounds(&self) -> Result<DateBounds>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticColumnCatalog {
    columns: ColumnSet,
}

impl StaticColumnCatalog {
    #[must_use]
    pub fn new(columns: ColumnSet) -> Self {
        Self { columns }
    }
}

impl ColumnCatalog for StaticColumnCatalog {
    fn existing_columns(&self) -> Result<ColumnSet> {
        Ok(self.columns.clone())
    }
}

/// Read-through cache in front of another catalog. Entries older than `ttl`
/// are refetched; failed fetches are never cached.
#[derive(Debug)]
pub struct CachedColumnCatalog<C> {
    inner: C,
    ttl: Duration,
    cached: Mutex<Option<CachedColumns>>,
}

#[derive(Debug, Clone)]
struct CachedColumns {
    fetched_at: Instant,
    columns: ColumnSet,
}

impl<C: ColumnCatalog> CachedColumnCatalog<C> {
    #[must_use]
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: Mutex::new(None),
        }
    }

    pub fn invalidate(&self) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn fresh_entry(&self) -> Option<ColumnSet> {
        let guard = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.columns.clone())
    }
}

impl<C: ColumnCatalog> ColumnCatalog for CachedColumnCatalog<C> {
    fn existing_columns(&self) -> Result<ColumnSet> {
        if let Some(columns) = self.fresh_entry() {
            return Ok(columns);
        }

        let columns = self.inner.existing_columns()?;
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(CachedColumns {
            fetched_at: Instant::now(),
            columns: columns.clone(),
        });
        Ok(columns)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ContextWarning {
    SchemaUnavailable { cause: String },
    BoundsUnavailable { cause: String },
}

impl ContextWarning {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SchemaUnavailable { .. } => "schema_unavailable",
            Self::BoundsUnavailable { .. } => "bounds_unavailable",
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::SchemaUnavailable { cause } => {
                format!("column introspection failed; using default column lists: {cause}")
            }
            Self::BoundsUnavailable { cause } => {
                format!("date bounds unavailable; relative time anchored to today: {cause}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedContext {
    pub context: DbContext,
    pub warnings: Vec<ContextWarning>,
}

/// Assembles a [`DbContext`]. Introspection failures never abort: they leave
/// the affected part unknown and are reported as warnings.
pub fn load_db_context(
    columns: &dyn ColumnCatalog,
    bounds: Option<&dyn DataBounds>,
) -> LoadedContext {
    let mut warnings = Vec::new();

    let existing_columns = match columns.existing_columns() {
        Ok(existing) => existing,
        Err(error) => {
            let warning = ContextWarning::SchemaUnavailable {
                cause: format!("{error:#}"),
            };
            tracing::warn!(code = warning.code(), "{}", warning.message());
            warnings.push(warning);
            ColumnSet::unrestricted()
        }
    };

    let date_bounds = match bounds.map(|source| source.date_bounds()) {
        None => DateBounds::default(),
        Some(Ok(found)) => found,
        Some(Err(error)) => {
            let warning = ContextWarning::BoundsUnavailable {
                cause: format!("{error:#}"),
            };
            tracing::warn!(code = warning.code(), "{}", warning.message());
            warnings.push(warning);
            DateBounds::default()
        }
    };

    LoadedContext {
        context: DbContext {
            existing_columns,
            max_known_date: date_bounds.max,
            min_known_date: date_bounds.min,
        },
        warnings,
    }
}
