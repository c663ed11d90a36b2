use crate::catalog::FACT_TABLE;
use crate::compiler::assemble::QueryText;
use crate::compiler::plan::GeneralRequest;
use crate::models::DbContext;

use super::scope_filter;

pub(super) fn build(request: &GeneralRequest, ctx: &DbContext) -> QueryText {
    QueryText::finish(format!(
        "SELECT * FROM {FACT_TABLE}{} LIMIT {}",
        scope_filter(&request.scope, ctx).where_clause(),
        request.limit
    ))
}
