use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::catalog::ContextWarning;
use crate::compiler::CompileError;
use crate::models::DbContext;
use crate::utils::time::{format_sql_date, format_unix_ms, unix_timestamp_seconds};

pub const COMPILE_ENVELOPE_SCHEMA_VERSION: &str = "argoq.compile-envelope.v1";

pub type QueryEnvelopeMeta = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelopeWarning {
    pub code: String,
    pub message: String,
}

impl From<&ContextWarning> for QueryEnvelopeWarning {
    fn from(warning: &ContextWarning) -> Self {
        Self {
            code: warning.code().to_string(),
            message: warning.message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelopeError {
    pub code: String,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// JSON document printed by the CLI for every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelope {
    pub ok: bool,
    pub command: String,
    pub generated_at_utc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    pub meta: QueryEnvelopeMeta,
    pub warnings: Vec<QueryEnvelopeWarning>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryEnvelopeError>,
}

impl QueryEnvelope {
    #[must_use]
    pub fn ok(command: impl Into<String>, data: Value) -> Self {
        Self::stamped(command.into(), Some(data), None)
    }

    #[must_use]
    pub fn failure(
        command: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        let error = QueryEnvelopeError {
            code: code.into(),
            message: message.into(),
            details,
        };
        Self::stamped(command.into(), None, Some(error))
    }

    /// Compile rejection keyed by the error's stable code.
    #[must_use]
    pub fn rejected(command: impl Into<String>, error: &CompileError, query_type: &str) -> Self {
        Self::failure(
            command,
            error.code(),
            error.to_string(),
            Some(json!({ "query_type": query_type })),
        )
    }

    fn stamped(command: String, data: Option<Value>, error: Option<QueryEnvelopeError>) -> Self {
        let meta = QueryEnvelopeMeta::from([(
            "schema_version".to_string(),
            json!(COMPILE_ENVELOPE_SCHEMA_VERSION),
        )]);
        Self {
            ok: error.is_none(),
            command,
            generated_at_utc: format_unix_ms(unix_timestamp_seconds().saturating_mul(1_000)),
            data,
            meta,
            warnings: Vec::new(),
            error,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_warning(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.warnings.push(QueryEnvelopeWarning {
            code: code.into(),
            message: message.into(),
        });
        self
    }

    #[must_use]
    pub fn with_context_warnings(mut self, warnings: &[ContextWarning]) -> Self {
        self.warnings.extend(warnings.iter().map(QueryEnvelopeWarning::from));
        self
    }

    /// Records what the compile ran against: the time anchor, the admitted
    /// columns, the lower date bound when known, and any degraded lookups.
    #[must_use]
    pub fn with_db_context(self, context: &DbContext, warnings: &[ContextWarning]) -> Self {
        let mut envelope = self
            .with_meta("anchor_date", json!(format_sql_date(context.anchor_date())))
            .with_meta("existing_columns", json!(context.existing_columns.names()));
        if let Some(min_known_date) = context.min_known_date {
            envelope = envelope.with_meta("min_known_date", json!(format_sql_date(min_known_date)));
        }
        envelope.with_context_warnings(warnings)
    }
}

/// Failure carrying the envelope to print. Validation failures (bad intent,
/// rejected compile) map to a different exit code than runtime failures.
#[derive(Debug, Clone)]
pub struct QueryEnvelopeCommandFailure {
    envelope: QueryEnvelope,
    validation: bool,
}

impl QueryEnvelopeCommandFailure {
    #[must_use]
    pub fn runtime(envelope: QueryEnvelope) -> Self {
        Self {
            envelope,
            validation: false,
        }
    }

    #[must_use]
    pub fn validation(envelope: QueryEnvelope) -> Self {
        Self {
            envelope,
            validation: true,
        }
    }

    #[must_use]
    pub fn envelope(&self) -> &QueryEnvelope {
        &self.envelope
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.validation
    }
}

impl Display for QueryEnvelopeCommandFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.envelope) {
            Ok(encoded) => f.write_str(&encoded),
            Err(_) => f.write_str("query envelope serialization failure"),
        }
    }
}

impl std::error::Error for QueryEnvelopeCommandFailure {}
