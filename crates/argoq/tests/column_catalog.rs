use std::cell::Cell;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use argoq::catalog::{
    CachedColumnCatalog, ColumnCatalog, ColumnSet, ContextWarning, DataBounds, DateBounds,
    FactColumn, SqliteCatalog, StaticColumnCatalog, load_db_context,
};
use rusqlite::Connection;
use time::macros::date;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

struct CountingCatalog {
    calls: Cell<usize>,
    fail: bool,
}

impl CountingCatalog {
    fn new(fail: bool) -> Self {
        Self {
            calls: Cell::new(0),
            fail,
        }
    }
}

impl ColumnCatalog for CountingCatalog {
    fn existing_columns(&self) -> Result<ColumnSet> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            bail!("information_schema unavailable");
        }
        Ok(ColumnSet::from_names(["float_id", "temperature"]))
    }
}

struct BrokenBounds;

impl DataBounds for BrokenBounds {
    fn date_bounds(&self) -> Result<DateBounds> {
        bail!("timeout reading max timestamp")
    }
}

#[test]
fn cached_catalog_reuses_fresh_entries() {
    let cached = CachedColumnCatalog::new(CountingCatalog::new(false), Duration::from_secs(300));

    let first = cached.existing_columns().expect("first fetch should succeed");
    let second = cached.existing_columns().expect("second fetch should succeed");

    assert_eq!(first, second);
    assert_eq!(cached.inner().calls.get(), 1);

    cached.invalidate();
    cached.existing_columns().expect("refetch should succeed");
    assert_eq!(cached.inner().calls.get(), 2);
}

#[test]
fn zero_ttl_refetches_every_time() {
    let cached = CachedColumnCatalog::new(CountingCatalog::new(false), Duration::ZERO);
    cached.existing_columns().expect("fetch should succeed");
    cached.existing_columns().expect("fetch should succeed");
    assert_eq!(cached.inner().calls.get(), 2);
}

#[test]
fn failed_fetches_are_not_cached() {
    let cached = CachedColumnCatalog::new(CountingCatalog::new(true), Duration::from_secs(300));
    assert!(cached.existing_columns().is_err());
    assert!(cached.existing_columns().is_err());
    assert_eq!(cached.inner().calls.get(), 2);
}

#[test]
fn schema_failure_degrades_to_unrestricted_columns() {
    let loaded = load_db_context(&CountingCatalog::new(true), None);

    assert!(loaded.context.existing_columns.is_empty());
    assert!(loaded.context.existing_columns.admits(FactColumn::Chlorophyll));
    assert_eq!(loaded.warnings.len(), 1);
    assert_eq!(loaded.warnings[0].code(), "schema_unavailable");
    assert!(
        loaded.warnings[0]
            .message()
            .contains("information_schema unavailable"),
        "unexpected warning: {:?}",
        loaded.warnings[0]
    );
}

#[test]
fn bounds_failure_leaves_the_anchor_unknown() {
    let columns = StaticColumnCatalog::new(ColumnSet::from_names(["float_id"]));
    let loaded = load_db_context(&columns, Some(&BrokenBounds));

    assert!(loaded.context.max_known_date.is_none());
    assert!(matches!(
        loaded.warnings.as_slice(),
        [ContextWarning::BoundsUnavailable { .. }]
    ));
}

#[test]
fn sqlite_catalog_reports_columns_and_bounds_from_a_file() {
    let temp = unique_temp_dir("argoq-catalog");
    std::fs::create_dir_all(&temp).expect("temp dir should be creatable");
    let db_path = temp.join("argo.sqlite");
    {
        let connection = Connection::open(&db_path).expect("sqlite file should open");
        connection
            .execute_batch(
                "CREATE TABLE argo_data (
                    float_id INTEGER,
                    timestamp TEXT,
                    latitude REAL,
                    longitude REAL,
                    pressure REAL,
                    temperature REAL,
                    salinity REAL,
                    ph REAL
                );
                INSERT INTO argo_data VALUES (2902115, '2023-05-01 06:00:00', 13.1, 80.3, 5.0, 29.1, 34.2, 8.1);
                INSERT INTO argo_data VALUES (2902115, '2024-02-20 06:00:00', 13.4, 80.9, 5.0, 28.4, 34.0, 8.0);",
            )
            .expect("fixture should load");
    }

    let catalog = SqliteCatalog::open(&db_path).expect("catalog should open");
    let loaded = load_db_context(&catalog, Some(&catalog));

    assert!(loaded.warnings.is_empty(), "unexpected warnings: {:?}", loaded.warnings);
    assert!(loaded.context.existing_columns.contains(FactColumn::Ph));
    assert!(!loaded.context.existing_columns.contains(FactColumn::Nitrate));
    assert!(!loaded.context.existing_columns.admits(FactColumn::Nitrate));
    assert_eq!(loaded.context.min_known_date, Some(date!(2023 - 05 - 01)));
    assert_eq!(loaded.context.max_known_date, Some(date!(2024 - 02 - 20)));
    assert_eq!(loaded.context.anchor_date(), date!(2024 - 02 - 20));
}

#[test]
fn missing_catalog_file_is_an_error() {
    let err = SqliteCatalog::open(&unique_temp_dir("argoq-missing").join("argo.sqlite"))
        .expect_err("missing file must fail");
    assert!(err.to_string().contains("does not exist"), "unexpected error: {err}");
}
