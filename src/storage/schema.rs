use super::query::ProfileRow;
use crate::error::{Error, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// The one table the viewer reads
pub const TABLE_NAME: &str = "gprof_cc";

/// Column that only some exports carry
const PARENT_INDEX_COLUMN: &str = "parent_index";

/// The two table layouts produced by gprof exports.
///
/// `WithParentIndex` tables record the enclosing call-graph entry of every
/// child row explicitly; parent rows have a NULL `parent_index`.
/// `IndexPairs` tables carry no such column, and a parent row is recognised
/// by `index` and `index_1` naming the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    WithParentIndex,
    IndexPairs,
}

impl SchemaVariant {
    /// Introspect the table's columns
    pub fn detect(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([TABLE_NAME], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if columns.is_empty() {
            return Err(Error::MissingTable(TABLE_NAME));
        }

        if columns.iter().any(|c| c == PARENT_INDEX_COLUMN) {
            Ok(SchemaVariant::WithParentIndex)
        } else {
            Ok(SchemaVariant::IndexPairs)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SchemaVariant::WithParentIndex => "parent_index column",
            SchemaVariant::IndexPairs => "index pairs",
        }
    }

    /// Column list in the order [`ProfileRow::from_row`] expects
    pub fn select_columns(self) -> &'static str {
        match self {
            SchemaVariant::WithParentIndex => {
                r#""index", index_1, cpu_time_total, cpu_time_self, cpu_time_children, name, parent_index"#
            }
            SchemaVariant::IndexPairs => {
                r#""index", index_1, cpu_time_total, cpu_time_self, cpu_time_children, name, NULL AS parent_index"#
            }
        }
    }

    /// SQL predicate selecting parent (summary) rows
    pub fn parent_predicate(self) -> &'static str {
        match self {
            SchemaVariant::WithParentIndex => "parent_index IS NULL",
            SchemaVariant::IndexPairs => r#""index" = index_1"#,
        }
    }

    /// SQL expression naming the entry a child row belongs to
    pub fn caller_expr(self) -> &'static str {
        match self {
            SchemaVariant::WithParentIndex => r#"COALESCE(parent_index, "index")"#,
            SchemaVariant::IndexPairs => r#""index""#,
        }
    }

    /// Rust-side mirror of [`parent_predicate`](Self::parent_predicate)
    pub fn is_parent(self, row: &ProfileRow) -> bool {
        match self {
            SchemaVariant::WithParentIndex => row.parent_index.is_none(),
            SchemaVariant::IndexPairs => row.index.is_some() && row.index == row.index_1,
        }
    }
}

/// Open a database read-only and make sure SQLite accepts the file
pub fn open_read_only(path: &Path) -> Result<Connection> {
    let failure = |source| Error::ConnectionFailure {
        path: path.to_path_buf(),
        source,
    };

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(failure)?;

    // Opening is lazy; reading the header is what rejects non-database files
    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
        .map_err(failure)?;

    Ok(conn)
}

/// Schema variant and row count of a database file
pub fn describe(path: &Path) -> Result<(SchemaVariant, i64)> {
    let conn = open_read_only(path)?;
    let variant = SchemaVariant::detect(&conn)?;
    let rows: i64 = conn.query_row(
        &format!(r#"SELECT COUNT(*) FROM "{TABLE_NAME}""#),
        [],
        |row| row.get(0),
    )?;
    Ok((variant, rows))
}
