use super::planner::{QueryPlan, caller_sql, parent_name_sql};
use super::schema::SchemaVariant;
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};

/// One row of the call-graph table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRow {
    pub index: Option<i64>,
    pub index_1: Option<i64>,
    pub cpu_time_total: Option<f64>,
    pub cpu_time_self: Option<f64>,
    pub cpu_time_children: Option<f64>,
    pub name: Option<String>,
    /// Always `None` for tables without a `parent_index` column
    pub parent_index: Option<i64>,
}

impl ProfileRow {
    /// Map a row selected with [`SchemaVariant::select_columns`]
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ProfileRow {
            index: row.get(0)?,
            index_1: row.get(1)?,
            cpu_time_total: row.get(2)?,
            cpu_time_self: row.get(3)?,
            cpu_time_children: row.get(4)?,
            name: row.get(5)?,
            parent_index: row.get(6)?,
        })
    }

    pub fn cpu_sum(&self) -> Option<f64> {
        match (self.cpu_time_self, self.cpu_time_children) {
            (None, None) => None,
            (s, c) => Some(s.unwrap_or(0.0) + c.unwrap_or(0.0)),
        }
    }

    /// Index shown for this row: its own for parents, the referenced
    /// entry's for children
    pub fn display_index(&self, variant: SchemaVariant) -> Option<i64> {
        if variant.is_parent(self) {
            self.index
        } else {
            self.index_1
        }
    }

    /// The entry a child row belongs to; `None` for parent rows
    pub fn parent_ref(&self, variant: SchemaVariant) -> Option<i64> {
        if variant.is_parent(self) {
            return None;
        }
        match variant {
            SchemaVariant::WithParentIndex => self.parent_index.or(self.index),
            SchemaVariant::IndexPairs => self.index,
        }
    }
}

/// The edge through which a selected entry is reached, and who calls it
#[derive(Debug, Clone, PartialEq)]
pub struct CallerRow {
    pub row: ProfileRow,
    pub caller_index: i64,
    /// Filled in from the caller's summary row when that lookup succeeds
    pub caller_name: Option<String>,
}

/// Number of rows matching the plan's filter, ignoring the limit
pub fn count_rows(conn: &Connection, plan: &QueryPlan) -> Result<i64> {
    let total = conn.query_row(
        &plan.count_sql(),
        params_from_iter(plan.where_params.iter()),
        |row| row.get(0),
    )?;
    Ok(total)
}

pub fn fetch_rows(
    conn: &Connection,
    plan: &QueryPlan,
    variant: SchemaVariant,
    limit: u32,
) -> Result<Vec<ProfileRow>> {
    let mut stmt = conn.prepare(&plan.select_sql(variant))?;
    let rows = stmt
        .query_map(params_from_iter(plan.select_params(limit)), ProfileRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Find the heaviest edge pointing at `selected` from another entry
pub fn fetch_caller(
    conn: &Connection,
    variant: SchemaVariant,
    selected: i64,
) -> Result<Option<CallerRow>> {
    let caller = conn
        .query_row(&caller_sql(variant), [selected], |row| {
            Ok(CallerRow {
                row: ProfileRow::from_row(row)?,
                caller_index: row.get(7)?,
                caller_name: None,
            })
        })
        .optional()?;
    Ok(caller)
}

/// Name of the summary row for `index`, if there is one
pub fn lookup_parent_name(
    conn: &Connection,
    variant: SchemaVariant,
    index: i64,
) -> Result<Option<String>> {
    let name = conn
        .query_row(&parent_name_sql(variant), [index], |row| {
            row.get::<_, Option<String>>(0)
        })
        .optional()?;
    Ok(name.flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::View;
    use crate::storage::planner::plan_view;
    use crate::storage::test_support;

    fn run(
        conn: &Connection,
        variant: SchemaVariant,
        view: View,
        search: Option<&str>,
        limit: u32,
    ) -> (i64, Vec<ProfileRow>) {
        let plan = plan_view(view, search, variant);
        let total = count_rows(conn, &plan).unwrap();
        let rows = fetch_rows(conn, &plan, variant, limit).unwrap();
        (total, rows)
    }

    #[test]
    fn test_parents_only_returns_parent_rows() {
        for (conn, variant) in [
            (test_support::with_parent_index(), SchemaVariant::WithParentIndex),
            (test_support::index_pairs(), SchemaVariant::IndexPairs),
        ] {
            let (total, rows) = run(&conn, variant, View::Parents, None, 100);
            assert_eq!(total, 4);
            assert!(rows.iter().all(|row| variant.is_parent(row)));
            let order: Vec<Option<i64>> = rows.iter().map(|r| r.index).collect();
            assert_eq!(order, vec![Some(1), Some(2), Some(3), Some(4)]);
        }
    }

    #[test]
    fn test_children_view_puts_selection_first() {
        let conn = test_support::with_parent_index();
        let variant = SchemaVariant::WithParentIndex;
        let (total, rows) = run(&conn, variant, View::Children { index: 1 }, None, 100);

        assert_eq!(total, 3);
        assert_eq!(rows[0].index, Some(1));
        assert!(rows[1..].iter().all(|row| row.parent_index == Some(1)));
        // heavier child first
        assert_eq!(rows[1].index_1, Some(2));
        assert_eq!(rows[2].index_1, Some(3));
    }

    #[test]
    fn test_children_view_index_pairs() {
        let conn = test_support::index_pairs();
        let variant = SchemaVariant::IndexPairs;
        let (total, rows) = run(&conn, variant, View::Children { index: 2 }, None, 100);

        assert_eq!(total, 2);
        assert!(rows.iter().all(|row| row.index == Some(2)));
        assert!(variant.is_parent(&rows[0]));
        assert_eq!(rows[1].display_index(variant), Some(3));
        assert_eq!(rows[1].parent_ref(variant), Some(2));
    }

    #[test]
    fn test_top_cpu_skips_null_totals() {
        let conn = test_support::with_parent_index();
        let (total, rows) = run(&conn, SchemaVariant::WithParentIndex, View::TopCpu, None, 100);
        assert_eq!(total, 3);
        assert!(rows.iter().all(|row| row.cpu_time_total.is_some()));
        assert_eq!(rows[0].cpu_time_total, Some(100.0));
    }

    #[test]
    fn test_limit_bounds_rows_not_total() {
        let conn = test_support::with_parent_index();
        let (total, rows) = run(&conn, SchemaVariant::WithParentIndex, View::All, None, 2);
        assert_eq!(total, 7);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_search_filters_by_substring() {
        let conn = test_support::with_parent_index();
        let variant = SchemaVariant::WithParentIndex;

        let (total, rows) = run(&conn, variant, View::All, Some("ALLOC"), 100);
        assert_eq!(total, 3);
        assert!(rows.iter().all(|row| {
            row.name.as_deref().unwrap().to_lowercase().contains("alloc")
        }));

        let (total, rows) = run(&conn, variant, View::Parents, Some("alloc"), 100);
        assert_eq!(total, 1);
        assert_eq!(rows[0].index, Some(3));

        // wildcards in the needle are literal
        let (total, _) = run(&conn, variant, View::All, Some("%"), 100);
        assert_eq!(total, 0);
        let (total, _) = run(&conn, variant, View::All, Some("<cycle"), 100);
        assert_eq!(total, 1);
    }

    #[test]
    fn test_caller_lookup() {
        for (conn, variant) in [
            (test_support::with_parent_index(), SchemaVariant::WithParentIndex),
            (test_support::index_pairs(), SchemaVariant::IndexPairs),
        ] {
            let caller = fetch_caller(&conn, variant, 3).unwrap().unwrap();
            assert_eq!(caller.caller_index, 2);
            assert_eq!(caller.row.index_1, Some(3));

            let name = lookup_parent_name(&conn, variant, caller.caller_index).unwrap();
            assert_eq!(name.as_deref(), Some("process [2]"));

            assert!(fetch_caller(&conn, variant, 1).unwrap().is_none());
            assert!(fetch_caller(&conn, variant, 99).unwrap().is_none());
        }
    }

    #[test]
    fn test_lookup_parent_name_missing() {
        let conn = test_support::with_parent_index();
        let name = lookup_parent_name(&conn, SchemaVariant::WithParentIndex, 42).unwrap();
        assert!(name.is_none());
    }

    #[test]
    fn test_cpu_sum() {
        let row = ProfileRow {
            cpu_time_self: Some(0.25),
            cpu_time_children: None,
            ..ProfileRow::default()
        };
        assert_eq!(row.cpu_sum(), Some(0.25));
        assert_eq!(ProfileRow::default().cpu_sum(), None);
    }
}
