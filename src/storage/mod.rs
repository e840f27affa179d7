mod planner;
mod query;
pub mod report;
mod schema;

#[cfg(test)]
pub(crate) mod test_support;

pub use planner::{CPU_SUM_EXPR, QueryPlan, caller_sql, like_pattern, parent_name_sql, plan_view};
pub use query::{
    CallerRow, ProfileRow, count_rows, fetch_caller, fetch_rows, lookup_parent_name,
};
pub use schema::{SchemaVariant, TABLE_NAME, describe, open_read_only};
