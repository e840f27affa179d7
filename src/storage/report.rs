//! Aggregate queries behind the `report` command
use super::planner::like_pattern;
use super::schema::TABLE_NAME;
use crate::error::Result;
use rusqlite::{Connection, Row, ToSql};
use serde::Serialize;

/// Whole-table statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_entries: i64,
    pub with_timing: i64,
    pub avg_pct_total: Option<f64>,
    pub max_pct_total: Option<f64>,
    pub sum_self_time: Option<f64>,
    pub avg_self_time: Option<f64>,
}

/// One function line of a report section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub name: Option<String>,
    pub index: Option<i64>,
    pub pct_total: Option<f64>,
    pub time_self: Option<f64>,
    pub time_children: Option<f64>,
    /// Share of the total spent in self or children time, for the sections
    /// that rank by one of them
    pub share_pct: Option<f64>,
}

impl ReportEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ReportEntry {
            name: row.get(0)?,
            index: row.get(1)?,
            pct_total: row.get(2)?,
            time_self: row.get(3)?,
            time_children: row.get(4)?,
            share_pct: row.get(5)?,
        })
    }
}

fn entries(conn: &Connection, where_order: &str, params: &[&dyn ToSql]) -> Result<Vec<ReportEntry>> {
    entries_with_share(conn, "NULL", where_order, params)
}

fn entries_with_share(
    conn: &Connection,
    share_expr: &str,
    where_order: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<ReportEntry>> {
    let sql = format!(
        r#"SELECT name, "index",
            ROUND(cpu_time_total, 2),
            ROUND(cpu_time_self, 2),
            ROUND(cpu_time_children, 2),
            {share_expr}
        FROM "{TABLE_NAME}"
        {where_order}"#
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, ReportEntry::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn summary(conn: &Connection) -> Result<Summary> {
    let summary = conn.query_row(
        &format!(
            r#"SELECT
                COUNT(*),
                COUNT(cpu_time_total),
                ROUND(AVG(cpu_time_total), 4),
                ROUND(MAX(cpu_time_total), 2),
                ROUND(SUM(cpu_time_self), 2),
                ROUND(AVG(cpu_time_self), 4)
            FROM "{TABLE_NAME}""#
        ),
        [],
        |row| {
            Ok(Summary {
                total_entries: row.get(0)?,
                with_timing: row.get(1)?,
                avg_pct_total: row.get(2)?,
                max_pct_total: row.get(3)?,
                sum_self_time: row.get(4)?,
                avg_self_time: row.get(5)?,
            })
        },
    )?;
    Ok(summary)
}

/// Entries with the largest total CPU share
pub fn top_cpu(conn: &Connection, limit: usize) -> Result<Vec<ReportEntry>> {
    entries(
        conn,
        "WHERE cpu_time_total IS NOT NULL ORDER BY cpu_time_total DESC LIMIT ?",
        &[&(limit as i64)],
    )
}

/// Entries whose own code takes more than `threshold` seconds
pub fn high_self_time(conn: &Connection, threshold: f64, limit: usize) -> Result<Vec<ReportEntry>> {
    entries_with_share(
        conn,
        "ROUND(100.0 * cpu_time_self / NULLIF(cpu_time_total, 0), 1)",
        "WHERE cpu_time_self > ? ORDER BY cpu_time_self DESC LIMIT ?",
        &[&threshold, &(limit as i64)],
    )
}

/// Entries spending the most time in their callees
pub fn expensive_children(conn: &Connection, limit: usize) -> Result<Vec<ReportEntry>> {
    entries_with_share(
        conn,
        "ROUND(100.0 * cpu_time_children / NULLIF(cpu_time_total, 0), 1)",
        "WHERE cpu_time_children IS NOT NULL ORDER BY cpu_time_children DESC LIMIT ?",
        &[&(limit as i64)],
    )
}

pub fn search(conn: &Connection, needle: &str, limit: usize) -> Result<Vec<ReportEntry>> {
    entries(
        conn,
        r"WHERE name LIKE ? ESCAPE '\' ORDER BY cpu_time_total DESC NULLS LAST LIMIT ?",
        &[&like_pattern(needle), &(limit as i64)],
    )
}

/// Entries gprof marked as part of a call cycle
pub fn cycles(conn: &Connection, limit: usize) -> Result<Vec<ReportEntry>> {
    entries(
        conn,
        "WHERE name LIKE '%cycle%' ORDER BY cpu_time_total DESC NULLS LAST LIMIT ?",
        &[&(limit as i64)],
    )
}
