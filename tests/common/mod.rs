#![allow(dead_code)]

use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

/// `index`, `index_1`, total, self, children, name, `parent_index`
pub type Row<'a> = (
    Option<i64>,
    i64,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    &'a str,
    Option<i64>,
);

/// A small call graph exported with a `parent_index` column
pub const WITH_PARENT_INDEX: &[Row<'static>] = &[
    (Some(1), 1, Some(100.0), Some(0.0), Some(0.6), "main [1]", None),
    (None, 2, None, Some(0.1), Some(0.4), "parse_args [2]", Some(1)),
    (None, 17, None, Some(0.05), Some(0.0), "alloc_buffer [17]", Some(1)),
    (Some(2), 2, Some(70.0), Some(0.1), Some(0.4), "parse_args [2]", None),
    (None, 17, None, Some(0.3), Some(0.1), "alloc_buffer [17]", Some(2)),
    (Some(17), 17, Some(40.0), Some(0.35), Some(0.1), "alloc_buffer [17]", None),
];

/// The same graph in the older layout without `parent_index`
pub const INDEX_PAIRS: &[Row<'static>] = &[
    (Some(1), 1, Some(100.0), Some(0.0), Some(0.6), "main [1]", None),
    (Some(1), 2, None, Some(0.1), Some(0.4), "parse_args [2]", None),
    (Some(1), 17, None, Some(0.05), Some(0.0), "alloc_buffer [17]", None),
    (Some(2), 2, Some(70.0), Some(0.1), Some(0.4), "parse_args [2]", None),
    (Some(2), 17, None, Some(0.3), Some(0.1), "alloc_buffer [17]", None),
    (Some(17), 17, Some(40.0), Some(0.35), Some(0.1), "alloc_buffer [17]", None),
];

pub fn write_database(path: &Path, rows: &[Row<'_>], parent_column: bool) {
    let conn = Connection::open(path).unwrap();
    let extra = if parent_column { ", parent_index INTEGER" } else { "" };
    conn.execute_batch(&format!(
        r#"CREATE TABLE gprof_cc (
            "index" INTEGER,
            index_1 INTEGER,
            cpu_time_total REAL,
            cpu_time_self REAL,
            cpu_time_children REAL,
            name TEXT{extra}
        );"#
    ))
    .unwrap();

    for (index, index_1, total, own, children, name, parent) in rows {
        if parent_column {
            conn.execute(
                r#"INSERT INTO gprof_cc VALUES (?, ?, ?, ?, ?, ?, ?)"#,
                params![index, index_1, total, own, children, name, parent],
            )
            .unwrap();
        } else {
            conn.execute(
                r#"INSERT INTO gprof_cc VALUES (?, ?, ?, ?, ?, ?)"#,
                params![index, index_1, total, own, children, name],
            )
            .unwrap();
        }
    }
}

/// Temp dir holding `parent.sqlite` and `pairs.db`
pub fn install_dir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    write_database(&dir.path().join("parent.sqlite"), WITH_PARENT_INDEX, true);
    write_database(&dir.path().join("pairs.db"), INDEX_PAIRS, false);
    let path = dir.path().to_path_buf();
    (dir, path)
}
