use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags};
use time::Date;

use super::{ColumnCatalog, ColumnSet, DataBounds, DateBounds, FACT_TABLE};
use crate::utils::time::{date_from_unix_seconds, parse_date};

/// Column introspection for executors that talk to the production Postgres
/// database directly rather than through a sqlite mirror.
pub const POSTGRES_COLUMNS_SQL: &str =
    "SELECT column_name FROM information_schema.columns WHERE table_name = 'argo_data';";

/// Catalog backed by a sqlite copy of the fact table.
#[derive(Debug)]
pub struct SqliteCatalog {
    connection: Connection,
}

impl SqliteCatalog {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!("catalog database does not exist: {}", path.display());
        }

        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open catalog database: {}", path.display()))?;
        Ok(Self { connection })
    }

    #[must_use]
    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn column_names(&self) -> Result<Vec<String>> {
        let pragma_sql = format!("PRAGMA table_info('{FACT_TABLE}')");
        let mut statement = self
            .connection
            .prepare(&pragma_sql)
            .with_context(|| format!("failed to prepare column introspection for `{FACT_TABLE}`"))?;

        let rows = statement
            .query_map([], |row| row.get::<usize, String>(1))
            .with_context(|| format!("failed to execute column introspection for `{FACT_TABLE}`"))?;

        let names = rows
            .map(|row| row.context("failed to decode column introspection row"))
            .collect::<Result<Vec<_>>>()?;
        if names.is_empty() {
            bail!("fact table `{FACT_TABLE}` not found in catalog database");
        }
        Ok(names)
    }

    /// Distinct calendar months holding data, keyed by year with months
    /// ascending. Rows whose timestamp text does not parse are skipped.
    pub fn available_periods(&self) -> Result<BTreeMap<i32, Vec<u8>>> {
        let query = format!(
            "SELECT DISTINCT CAST(strftime('%Y', \"timestamp\") AS INTEGER), \
             CAST(strftime('%m', \"timestamp\") AS INTEGER) \
             FROM {FACT_TABLE} WHERE strftime('%Y', \"timestamp\") IS NOT NULL"
        );
        let mut statement = self
            .connection
            .prepare(&query)
            .context("failed to prepare available periods query")?;
        let rows = statement
            .query_map([], |row| Ok((row.get::<usize, i32>(0)?, row.get::<usize, u8>(1)?)))
            .context("failed to execute available periods query")?;

        let mut periods = BTreeMap::<i32, Vec<u8>>::new();
        for row in rows {
            let (year, month) = row.context("failed to decode available period row")?;
            periods.entry(year).or_default().push(month);
        }
        for months in periods.values_mut() {
            months.sort_unstable();
            months.dedup();
        }
        Ok(periods)
    }
}

impl ColumnCatalog for SqliteCatalog {
    fn existing_columns(&self) -> Result<ColumnSet> {
        self.column_names().map(ColumnSet::from_names)
    }
}

impl DataBounds for SqliteCatalog {
    fn date_bounds(&self) -> Result<DateBounds> {
        let query = format!("SELECT MIN(\"timestamp\"), MAX(\"timestamp\") FROM {FACT_TABLE}");
        let (min, max) = self
            .connection
            .query_row(&query, [], |row| {
                Ok((
                    row.get::<usize, SqlValue>(0)?,
                    row.get::<usize, SqlValue>(1)?,
                ))
            })
            .context("failed to query fact table date bounds")?;

        Ok(DateBounds {
            min: date_from_sql(min).context("failed to decode minimum timestamp")?,
            max: date_from_sql(max).context("failed to decode maximum timestamp")?,
        })
    }
}

fn date_from_sql(value: SqlValue) -> Result<Option<Date>> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Text(text) => parse_date(&text).map(Some),
        SqlValue::Integer(epoch_seconds) => date_from_unix_seconds(epoch_seconds).map(Some),
        SqlValue::Real(epoch_seconds) => date_from_real_seconds(epoch_seconds).map(Some),
        SqlValue::Blob(_) => bail!("timestamp column holds a blob"),
    }
}

// The upper bound is exclusive: `i64::MAX as f64` rounds up to 2^63.
fn date_from_real_seconds(epoch_seconds: f64) -> Result<Date> {
    if !epoch_seconds.is_finite()
        || epoch_seconds < i64::MIN as f64
        || epoch_seconds >= i64::MAX as f64
    {
        bail!("timestamp value {epoch_seconds} is not a usable epoch second");
    }
    date_from_unix_seconds(epoch_seconds.floor() as i64)
}
