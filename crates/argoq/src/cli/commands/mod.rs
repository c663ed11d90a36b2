pub mod compile;
pub mod context;
pub mod locations;
pub mod schema;

use anyhow::{Error, Result};
use serde_json::json;

use crate::models::{QueryEnvelope, QueryEnvelopeCommandFailure};

/// Prints an envelope as a single JSON line on stdout.
pub(crate) fn emit(envelope: &QueryEnvelope) -> Result<()> {
    let encoded = serde_json::to_string(envelope).map_err(|error| {
        Error::new(QueryEnvelopeCommandFailure::runtime(QueryEnvelope::failure(
            envelope.command.clone(),
            "response_encode_failed",
            "failed to encode response",
            Some(json!({ "cause": format!("{error:#}") })),
        )))
    })?;
    println!("{encoded}");
    Ok(())
}
