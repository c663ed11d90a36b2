use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::location;
use crate::models::QueryEnvelope;

#[derive(Debug, Clone, Args)]
pub struct LocationsArgs {
    /// Only list places whose name contains this text.
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,
}

pub fn run(args: &LocationsArgs) -> Result<()> {
    let needle = args
        .filter
        .as_deref()
        .map(|text| text.trim().to_lowercase())
        .filter(|text| !text.is_empty());
    let places = location::entries()
        .iter()
        .filter(|place| {
            needle
                .as_deref()
                .is_none_or(|needle| place.name.contains(needle))
        })
        .collect::<Vec<_>>();

    let envelope = QueryEnvelope::ok("locations", json!({ "locations": places }))
        .with_meta("count", json!(places.len()));
    super::emit(&envelope)
}
