use std::path::PathBuf;

use anyhow::{Error, Result};
use clap::Args;
use serde_json::json;

use crate::catalog::{SqliteCatalog, load_db_context};
use crate::config::RuntimePaths;
use crate::models::{QueryEnvelope, QueryEnvelopeCommandFailure};
use crate::utils::time::format_sql_date;

const COMMAND: &str = "context";

#[derive(Debug, Clone, Args)]
pub struct ContextArgs {
    #[arg(long, value_name = "PATH")]
    pub catalog_db: PathBuf,

    /// Also list the year/month periods that hold data.
    #[arg(long, default_value_t = false)]
    pub periods: bool,
}

pub fn run(args: &ContextArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let path = runtime_paths.resolve_path(&args.catalog_db)?;
    let catalog = SqliteCatalog::open(&path).map_err(|error| {
        Error::new(QueryEnvelopeCommandFailure::runtime(QueryEnvelope::failure(
            COMMAND,
            "catalog_unavailable",
            "unable to open catalog database",
            Some(json!({
                "catalog_db": path.display().to_string(),
                "cause": format!("{error:#}"),
            })),
        )))
    })?;

    let loaded = load_db_context(&catalog, Some(&catalog));
    let context = &loaded.context;
    let mut data = json!({
        "existing_columns": context.existing_columns.names(),
        "min_known_date": context.min_known_date.map(format_sql_date),
        "max_known_date": context.max_known_date.map(format_sql_date),
    });

    let mut periods_failure = None;
    if args.periods {
        match catalog.available_periods() {
            Ok(periods) => data["periods"] = json!(periods),
            Err(error) => {
                tracing::warn!(error = %format!("{error:#}"), "available periods unavailable");
                periods_failure = Some(format!("available periods could not be listed: {error:#}"));
            }
        }
    }

    let mut envelope = QueryEnvelope::ok(COMMAND, data)
        .with_meta("catalog_db", json!(path.display().to_string()))
        .with_context_warnings(&loaded.warnings);
    if let Some(message) = periods_failure {
        envelope = envelope.with_warning("periods_unavailable", message);
    }
    super::emit(&envelope)
}
