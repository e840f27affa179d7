//! Small call graphs in both table layouts.
//!
//! `main [1]` calls `process [2]` and `alloc_buffer [3]`; `process` calls
//! `alloc_buffer`; `orphan <cycle 1> [4]` stands alone with no total.

use rusqlite::Connection;
use std::path::Path;

type FixtureRow = (
    Option<i64>,
    i64,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    &'static str,
    Option<i64>,
);

const WITH_PARENT_INDEX: &[FixtureRow] = &[
    (Some(1), 1, Some(100.0), Some(0.0), Some(0.50), "main [1]", None),
    (None, 2, None, Some(0.10), Some(0.30), "process [2]", Some(1)),
    (None, 3, None, Some(0.05), Some(0.05), "alloc_buffer [3]", Some(1)),
    (Some(2), 2, Some(80.0), Some(0.10), Some(0.30), "process [2]", None),
    (None, 3, None, Some(0.20), Some(0.10), "alloc_buffer [3]", Some(2)),
    (Some(3), 3, Some(50.0), Some(0.25), Some(0.15), "alloc_buffer [3]", None),
    (Some(4), 4, None, Some(0.01), None, "orphan <cycle 1> [4]", None),
];

const INDEX_PAIRS: &[FixtureRow] = &[
    (Some(1), 1, Some(100.0), Some(0.0), Some(0.50), "main [1]", None),
    (Some(1), 2, None, Some(0.10), Some(0.30), "process [2]", None),
    (Some(1), 3, None, Some(0.05), Some(0.05), "alloc_buffer [3]", None),
    (Some(2), 2, Some(80.0), Some(0.10), Some(0.30), "process [2]", None),
    (Some(2), 3, None, Some(0.20), Some(0.10), "alloc_buffer [3]", None),
    (Some(3), 3, Some(50.0), Some(0.25), Some(0.15), "alloc_buffer [3]", None),
    (Some(4), 4, None, Some(0.01), None, "orphan <cycle 1> [4]", None),
];

fn populate(conn: &Connection, parent_column: bool, rows: &[FixtureRow]) {
    let extra = if parent_column { r#", "parent_index" INTEGER"# } else { "" };
    conn.execute_batch(&format!(
        r#"CREATE TABLE "gprof_cc" (
            "index" INTEGER,
            "pct_cpu_time" REAL,
            "cpu_time_total" REAL,
            "cpu_time_self" REAL,
            "cpu_time_children" REAL,
            "name" TEXT,
            "index_1" INTEGER{extra}
        );"#
    ))
    .unwrap();

    for (index, index_1, total, own, children, name, parent) in rows {
        if parent_column {
            conn.execute(
                r#"INSERT INTO gprof_cc ("index", index_1, cpu_time_total, cpu_time_self,
                   cpu_time_children, name, parent_index) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
                rusqlite::params![index, index_1, total, own, children, name, parent],
            )
            .unwrap();
        } else {
            conn.execute(
                r#"INSERT INTO gprof_cc ("index", index_1, cpu_time_total, cpu_time_self,
                   cpu_time_children, name) VALUES (?, ?, ?, ?, ?, ?)"#,
                rusqlite::params![index, index_1, total, own, children, name],
            )
            .unwrap();
        }
    }
}

pub fn with_parent_index() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    populate(&conn, true, WITH_PARENT_INDEX);
    conn
}

pub fn index_pairs() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    populate(&conn, false, INDEX_PAIRS);
    conn
}

pub fn write_with_parent_index(path: &Path) {
    let conn = Connection::open(path).unwrap();
    populate(&conn, true, WITH_PARENT_INDEX);
}

pub fn write_index_pairs(path: &Path) {
    let conn = Connection::open(path).unwrap();
    populate(&conn, false, INDEX_PAIRS);
}
