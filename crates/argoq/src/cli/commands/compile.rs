use std::path::{Path, PathBuf};

use anyhow::{Context, Error, Result};
use clap::{ArgGroup, Args};
use serde_json::json;
use time::Date;

use crate::catalog::{
    ColumnSet, ContextWarning, LoadedContext, SqliteCatalog, StaticColumnCatalog,
    load_db_context,
};
use crate::compiler;
use crate::config::RuntimePaths;
use crate::models::{DbContext, Intent, QueryEnvelope, QueryEnvelopeCommandFailure};
use crate::utils::time::parse_date;

const COMMAND: &str = "compile";

#[derive(Debug, Clone, Args)]
#[command(group(
    ArgGroup::new("intent_source")
        .required(true)
        .args(["intent", "intent_file"])
))]
pub struct CompileArgs {
    /// Intent document as inline JSON.
    #[arg(long, value_name = "JSON")]
    pub intent: Option<String>,

    #[arg(long, value_name = "PATH")]
    pub intent_file: Option<PathBuf>,

    /// Columns present in the fact table; overrides catalog introspection.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Sqlite mirror of `argo_data` to introspect for columns and date bounds.
    #[arg(long, value_name = "PATH")]
    pub catalog_db: Option<PathBuf>,

    #[arg(long, value_name = "DATE")]
    pub max_date: Option<String>,

    #[arg(long, value_name = "DATE")]
    pub min_date: Option<String>,
}

pub fn run(args: &CompileArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let intent = read_intent(args, runtime_paths)?;
    let LoadedContext { context, warnings } = load_context(args, runtime_paths)?;

    let archetype = compiler::plan(&intent).map_err(|error| {
        Error::new(QueryEnvelopeCommandFailure::validation(
            QueryEnvelope::rejected(COMMAND, &error, intent.query_type.as_str())
                .with_db_context(&context, &warnings),
        ))
    })?;
    let sql = compiler::compile_plan(&archetype, &context);
    tracing::info!(archetype = archetype.label(), "compiled intent");

    let envelope = QueryEnvelope::ok(
        COMMAND,
        json!({
            "sql": sql,
            "archetype": archetype.label(),
        }),
    );
    super::emit(&envelope.with_db_context(&context, &warnings))
}

fn read_intent(args: &CompileArgs, runtime_paths: &RuntimePaths) -> Result<Intent> {
    let (raw, source) = match (&args.intent, &args.intent_file) {
        (Some(inline), _) => (inline.clone(), "--intent".to_string()),
        (None, Some(path)) => {
            let path = runtime_paths.resolve_path(path)?;
            let raw = std::fs::read_to_string(&path).map_err(|error| {
                Error::new(QueryEnvelopeCommandFailure::runtime(QueryEnvelope::failure(
                    COMMAND,
                    "intent_unreadable",
                    "unable to read intent file",
                    Some(json!({
                        "path": path.display().to_string(),
                        "cause": error.to_string(),
                    })),
                )))
            })?;
            (raw, path.display().to_string())
        }
        (None, None) => {
            return Err(Error::new(QueryEnvelopeCommandFailure::validation(
                QueryEnvelope::failure(
                    COMMAND,
                    "intent_missing",
                    "pass --intent or --intent-file",
                    None,
                ),
            )));
        }
    };

    serde_json::from_str::<Intent>(&raw).map_err(|error| {
        Error::new(QueryEnvelopeCommandFailure::validation(
            QueryEnvelope::failure(
                COMMAND,
                "intent_invalid",
                "intent is not a valid document",
                Some(json!({
                    "source": source,
                    "cause": error.to_string(),
                })),
            ),
        ))
    })
}

fn load_context(args: &CompileArgs, runtime_paths: &RuntimePaths) -> Result<LoadedContext> {
    let mut loaded = match &args.catalog_db {
        Some(path) => load_from_catalog(&runtime_paths.resolve_path(path)?),
        None => load_db_context(
            &StaticColumnCatalog::new(ColumnSet::from_names(&args.columns)),
            None,
        ),
    };

    if !args.columns.is_empty() {
        loaded.context.existing_columns = ColumnSet::from_names(&args.columns);
    }
    if let Some(raw) = &args.max_date {
        loaded.context.max_known_date = Some(date_flag("--max-date", raw)?);
    }
    if let Some(raw) = &args.min_date {
        loaded.context.min_known_date = Some(date_flag("--min-date", raw)?);
    }
    Ok(loaded)
}

/// A catalog that cannot be opened degrades like any other introspection
/// failure: unknown columns, no anchor, and warnings for both. Each run reads
/// the schema once, so no column cache sits in front of it.
fn load_from_catalog(path: &Path) -> LoadedContext {
    match SqliteCatalog::open(path) {
        Ok(catalog) => load_db_context(&catalog, Some(&catalog)),
        Err(error) => {
            let cause = format!("{error:#}");
            tracing::warn!(path = %path.display(), %cause, "catalog database unavailable");
            LoadedContext {
                context: DbContext::default(),
                warnings: vec![
                    ContextWarning::SchemaUnavailable {
                        cause: cause.clone(),
                    },
                    ContextWarning::BoundsUnavailable { cause },
                ],
            }
        }
    }
}

fn date_flag(flag: &str, raw: &str) -> Result<Date> {
    parse_date(raw)
        .with_context(|| format!("invalid {flag} value `{raw}`"))
        .map_err(|error| {
            Error::new(QueryEnvelopeCommandFailure::validation(
                QueryEnvelope::failure(
                    COMMAND,
                    "date_invalid",
                    format!("{error:#}"),
                    Some(json!({ "flag": flag, "value": raw })),
                ),
            ))
        })
}
