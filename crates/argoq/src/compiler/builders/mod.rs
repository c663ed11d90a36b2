//! One renderer per archetype. Builders never fail: every validation has
//! already happened while planning.

mod general;
mod path;
mod profile;
mod proximity;
mod scatter;
mod statistic;
mod timeseries;
mod trajectory;

use super::assemble::{Filter, QueryText};
use super::plan::{Archetype, Scope};
use crate::catalog::FactColumn;
use crate::models::DbContext;

pub(crate) fn render(archetype: &Archetype, ctx: &DbContext) -> QueryText {
    match archetype {
        Archetype::Proximity(request) => proximity::build(request, ctx),
        Archetype::TimeSeries(request) => timeseries::build(request, ctx),
        Archetype::Statistic(request) => statistic::build(request, ctx),
        Archetype::Profile(request) => profile::build(request, ctx),
        Archetype::Trajectory(request) => trajectory::build(request, ctx),
        Archetype::Scatter(request) => scatter::build(request, ctx),
        Archetype::Path(request) => path::build(request, ctx),
        Archetype::General(request) => general::build(request, ctx),
    }
}

/// Location clause first, then the resolved time predicate.
fn scope_filter(scope: &Scope, ctx: &DbContext) -> Filter {
    let mut filter = Filter::new();
    if let Some(location) = &scope.location {
        filter.push_grouped(location.as_sql());
    }
    filter.push(
        ctx.time_resolver()
            .resolve(scope.time_constraint.as_deref())
            .to_sql(),
    );
    filter
}

fn float_predicate(float_id: i64) -> String {
    format!("{} = {float_id}", FactColumn::FloatId.quoted())
}
