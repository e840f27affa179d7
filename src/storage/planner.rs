use super::schema::{SchemaVariant, TABLE_NAME};
use crate::request::View;
use rusqlite::types::Value;

/// Sum of self and children time, NULLs counting as zero
pub const CPU_SUM_EXPR: &str = "COALESCE(cpu_time_self, 0) + COALESCE(cpu_time_children, 0)";

/// WHERE and ORDER BY for one view, with their bound values kept apart so
/// the same filter can drive both the row query and the count query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub where_sql: String,
    pub where_params: Vec<Value>,
    pub order_sql: String,
    pub order_params: Vec<Value>,
}

impl QueryPlan {
    pub fn select_sql(&self, variant: SchemaVariant) -> String {
        format!(
            r#"SELECT {} FROM "{TABLE_NAME}" {} {} LIMIT ?"#,
            variant.select_columns(),
            self.where_sql,
            self.order_sql
        )
    }

    /// Values for [`select_sql`](Self::select_sql), in placeholder order
    pub fn select_params(&self, limit: u32) -> Vec<Value> {
        let mut params = Vec::with_capacity(self.where_params.len() + self.order_params.len() + 1);
        params.extend(self.where_params.iter().cloned());
        params.extend(self.order_params.iter().cloned());
        params.push(Value::Integer(i64::from(limit)));
        params
    }

    pub fn count_sql(&self) -> String {
        format!(r#"SELECT COUNT(*) FROM "{TABLE_NAME}" {}"#, self.where_sql)
    }
}

/// Build the filter and ordering for `view`, optionally narrowed by a name
/// substring
pub fn plan_view(view: View, search: Option<&str>, variant: SchemaVariant) -> QueryPlan {
    let mut clauses: Vec<String> = Vec::new();
    let mut where_params = Vec::new();
    let mut order_params = Vec::new();

    let order_sql = match view {
        View::Children { index } => {
            match variant {
                SchemaVariant::WithParentIndex => {
                    clauses.push(r#"("index" = ? OR parent_index = ?)"#.to_string());
                    where_params.push(Value::Integer(index));
                    where_params.push(Value::Integer(index));
                }
                SchemaVariant::IndexPairs => {
                    clauses.push(r#""index" = ?"#.to_string());
                    where_params.push(Value::Integer(index));
                }
            }
            order_params.push(Value::Integer(index));
            format!(
                r#"ORDER BY CASE WHEN "index" = ? THEN 0 ELSE 1 END, {CPU_SUM_EXPR} DESC, ROWID"#
            )
        }
        View::Parents => {
            clauses.push(variant.parent_predicate().to_string());
            "ORDER BY cpu_time_total DESC, ROWID".to_string()
        }
        View::TopCpu => {
            clauses.push("cpu_time_total IS NOT NULL".to_string());
            "ORDER BY cpu_time_total DESC, ROWID".to_string()
        }
        View::All => "ORDER BY cpu_time_total DESC, ROWID".to_string(),
    };

    if let Some(search) = search.filter(|s| !s.is_empty()) {
        clauses.push(r"name LIKE ? ESCAPE '\'".to_string());
        where_params.push(Value::Text(like_pattern(search)));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    QueryPlan {
        where_sql,
        where_params,
        order_sql,
        order_params,
    }
}

/// Statement finding the edge through which the selected entry is called.
/// Binds one value: the selected index. The caller index is the last column.
pub fn caller_sql(variant: SchemaVariant) -> String {
    let caller = variant.caller_expr();
    format!(
        r#"SELECT {}, {caller} AS caller_index FROM "{TABLE_NAME}"
        WHERE index_1 = ? AND "index" IS NOT index_1 AND {caller} IS NOT NULL
        ORDER BY cpu_time_total DESC, {CPU_SUM_EXPR} DESC, ROWID
        LIMIT 1"#,
        variant.select_columns()
    )
}

/// Statement fetching the name of an entry's summary row. Binds the index.
pub fn parent_name_sql(variant: SchemaVariant) -> String {
    format!(
        r#"SELECT name FROM "{TABLE_NAME}" WHERE "index" = ? AND {} ORDER BY ROWID LIMIT 1"#,
        variant.parent_predicate()
    )
}

/// `LIKE` pattern matching names that contain `needle` literally
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
