//! Intent-to-SQL compilation.
//!
//! [`compile`] plans an [`Archetype`] from the intent, which is where every
//! validation failure surfaces, then renders it against the [`DbContext`].
//! Output depends only on the two inputs.

mod assemble;
mod builders;
mod error;
mod guard;
mod plan;
mod ranking;

pub use assemble::QueryText;
pub use error::CompileError;
pub use guard::LocationClause;
pub use plan::{
    Archetype, DEFAULT_DISTANCE_KM, DEFAULT_PROXIMITY_LIMIT, DEFAULT_TIME_SERIES_LIMIT,
    GENERAL_ROW_CAP, GeneralRequest, PathRequest, ProfileRequest, ProximityRequest,
    SCATTER_ROW_CAP, ScatterRequest, Scope, StatisticRequest, TimeSeriesRequest,
    TrajectoryRequest,
};

use crate::models::{DbContext, Intent};

pub fn compile(intent: &Intent, ctx: &DbContext) -> Result<QueryText, CompileError> {
    let archetype = plan(intent)?;
    Ok(compile_plan(&archetype, ctx))
}

pub fn plan(intent: &Intent) -> Result<Archetype, CompileError> {
    let archetype = Archetype::from_intent(intent).inspect_err(|error| {
        tracing::debug!(code = error.code(), %error, "intent rejected");
    })?;
    tracing::debug!(
        requested = intent.query_type.as_str(),
        archetype = archetype.label(),
        "planned intent"
    );
    Ok(archetype)
}

#[must_use]
pub fn compile_plan(archetype: &Archetype, ctx: &DbContext) -> QueryText {
    builders::render(archetype, ctx)
}
