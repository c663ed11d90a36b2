pub mod context;
pub mod intent;
pub mod query_envelope;

pub use context::DbContext;
pub use intent::{Aggregation, Intent, QueryType, json_schema};
pub use query_envelope::{
    COMPILE_ENVELOPE_SCHEMA_VERSION, QueryEnvelope, QueryEnvelopeCommandFailure,
    QueryEnvelopeError, QueryEnvelopeWarning,
};
