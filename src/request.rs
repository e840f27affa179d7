//! Request parameters and database resolution
//!
//! A request is a plain `application/x-www-form-urlencoded` query string.
//! Parsing never fails: unknown or malformed values fall back to defaults.
//! Only the database selector can make a request unservable, and that is
//! reported by [`resolve_database`].

use crate::config::ViewerConfig;
use crate::error::{Error, NotFoundReason, Result};
use std::fs;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};
use url::form_urlencoded;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MIN_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 10_000;

/// Which slice of the call graph a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    All,
    Parents,
    TopCpu,
    /// A selected node together with its children
    Children { index: i64 },
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::All => "all",
            View::Parents => "parents",
            View::TopCpu => "top_cpu",
            View::Children { .. } => "children",
        }
    }

    pub fn selected_index(&self) -> Option<i64> {
        match self {
            View::Children { index } => Some(*index),
            _ => None,
        }
    }

    fn from_name(name: &str) -> View {
        match name {
            "all" => View::All,
            "top_cpu" => View::TopCpu,
            _ => View::Parents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub view: View,
    pub limit: u32,
    pub search: Option<String>,
    pub db: Option<String>,
}

impl Default for ViewRequest {
    fn default() -> Self {
        ViewRequest {
            view: View::Parents,
            limit: DEFAULT_LIMIT,
            search: None,
            db: None,
        }
    }
}

impl ViewRequest {
    /// Parse a raw query string (without the leading `?`)
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    /// Build a request from decoded key/value pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut view_name: Option<String> = None;
        let mut index: Option<i64> = None;
        let mut request = ViewRequest::default();

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "view" => view_name = Some(value.to_string()),
                "limit" => request.limit = parse_limit(value),
                "search" => {
                    request.search = (!value.is_empty()).then(|| value.to_string());
                }
                "index" => index = value.trim().parse().ok(),
                "db" => {
                    request.db = (!value.trim().is_empty()).then(|| value.trim().to_string());
                }
                _ => {}
            }
        }

        request.view = match index {
            Some(index) => View::Children { index },
            None => view_name.as_deref().map(View::from_name).unwrap_or(View::Parents),
        };
        request
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

fn parse_limit(value: &str) -> u32 {
    match value.trim().parse::<i64>() {
        Ok(n) => n.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as u32,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => MAX_LIMIT,
            IntErrorKind::NegOverflow => MIN_LIMIT,
            _ => DEFAULT_LIMIT,
        },
    }
}

/// A database file found next to the viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    /// File name, usable as a `db` selector
    pub name: String,
    pub path: PathBuf,
}

/// Resolve the request's database selector to a validated, absolute path
pub fn resolve_database(config: &ViewerConfig, request: &ViewRequest) -> Result<PathBuf> {
    let path = match (&request.db, &config.default_db) {
        (Some(selector), _) => selector_path(&config.install_dir, selector),
        (None, Some(default)) => default.clone(),
        (None, None) => return Err(Error::MissingParameter),
    };

    check_database_file(path, |p: &Path| fs::File::open(p))
}

/// Validate a candidate database path. `open` stands in for the readability
/// probe.
fn check_database_file<F>(path: PathBuf, open: F) -> Result<PathBuf>
where
    F: FnOnce(&Path) -> std::io::Result<fs::File>,
{
    let not_found = |reason| Error::NotFound {
        path: path.clone(),
        reason,
    };

    let metadata = fs::metadata(&path).map_err(|_| not_found(NotFoundReason::Missing))?;
    if !metadata.is_file() {
        return Err(not_found(NotFoundReason::NotAFile));
    }
    open(&path).map_err(|_| not_found(NotFoundReason::Unreadable))?;

    Ok(path.canonicalize().unwrap_or(path))
}

fn selector_path(install_dir: &Path, selector: &str) -> PathBuf {
    let candidate = Path::new(selector);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        install_dir.join(candidate)
    }
}

/// List database files in `dir`, sorted by name. Never fails; an unreadable
/// directory simply yields nothing.
pub fn discover_databases(config: &ViewerConfig, dir: &Path) -> Vec<DatabaseEntry> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "cannot enumerate databases");
            return Vec::new();
        }
    };

    let mut databases: Vec<DatabaseEntry> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && config.matches_extension(path))
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            Some(DatabaseEntry { name, path })
        })
        .collect();

    databases.sort_by(|a, b| a.name.cmp(&b.name));
    databases
}
