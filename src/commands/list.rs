use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::request::discover_databases;
use crate::storage::{SchemaVariant, describe};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Database info gathered for listing
pub struct DatabaseInfo {
    pub path: PathBuf,
    /// `None` when the file could not be read as a gprof database
    pub summary: Option<(SchemaVariant, i64)>,
    pub modified: String,
}

/// Find all gprof databases in a directory
pub fn find_databases(dir: &Path) -> Vec<DatabaseInfo> {
    let config = ViewerConfig::new(dir);
    let mut databases: Vec<DatabaseInfo> = discover_databases(&config, dir)
        .into_iter()
        .map(|entry| get_database_info(&entry.path))
        .collect();

    // Most recently modified first
    databases.sort_by(|a, b| b.modified.cmp(&a.modified));
    databases
}

fn get_database_info(path: &Path) -> DatabaseInfo {
    let summary = match describe(path) {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping database details");
            None
        }
    };

    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    DatabaseInfo {
        path: path.to_path_buf(),
        summary,
        modified,
    }
}

/// Run the list command
pub fn run(dir: Option<&Path>) -> Result<()> {
    let search_dir = dir.unwrap_or_else(|| Path::new("."));
    if !search_dir.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "{} is not a directory",
            search_dir.display()
        )));
    }

    let databases = find_databases(search_dir);
    if databases.is_empty() {
        println!("No gprof databases found in {}", search_dir.display());
        return Ok(());
    }

    println!(
        "{:<40} {:>10} {:>20} {:>17}",
        "FILE", "ROWS", "SCHEMA", "MODIFIED"
    );
    println!("{}", "-".repeat(90));

    for db in databases {
        let filename = db
            .path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        let (rows, schema) = match db.summary {
            Some((variant, rows)) => (rows.to_string(), variant.label()),
            None => ("?".to_string(), "?"),
        };

        println!(
            "{:<40} {:>10} {:>20} {:>17}",
            filename, rows, schema, db.modified
        );
    }

    Ok(())
}
