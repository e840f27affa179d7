use crate::error::Result;
use std::path::{Path, PathBuf};

/// Environment variable overriding the installation directory
pub const DB_DIR_ENV: &str = "GPROFVIEW_DB_DIR";

/// Environment variable naming a default database for `serve`
pub const DB_ENV: &str = "GPROFVIEW_DB";

/// File extensions recognised as gprof databases when enumerating a directory
pub const DEFAULT_EXTENSIONS: &[&str] = &["sqlite", "sqlite3", "db"];

/// Settings shared by every request the viewer serves
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Directory in which bare database names are resolved and siblings listed
    pub install_dir: PathBuf,
    /// Database used when a request carries no `db` parameter
    pub default_db: Option<PathBuf>,
    pub extensions: Vec<String>,
}

impl ViewerConfig {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        ViewerConfig {
            install_dir: install_dir.into(),
            default_db: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn with_default_db(mut self, db: Option<PathBuf>) -> Self {
        self.default_db = db;
        self
    }

    /// Build a config from an optional directory, falling back to the
    /// directory holding the running executable
    pub fn resolve(install_dir: Option<PathBuf>) -> Result<Self> {
        let dir = match install_dir {
            Some(dir) => dir,
            None => executable_dir()?,
        };
        Ok(ViewerConfig::new(dir))
    }

    /// Whether `path` carries one of the configured database extensions
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_extension() {
        let config = ViewerConfig::new("/srv/profiles");
        assert!(config.matches_extension(Path::new("run.sqlite")));
        assert!(config.matches_extension(Path::new("run.DB")));
        assert!(!config.matches_extension(Path::new("run.csv")));
        assert!(!config.matches_extension(Path::new("sqlite")));
    }

    #[test]
    fn test_resolve_explicit_dir() {
        let config = ViewerConfig::resolve(Some(PathBuf::from("/srv/profiles"))).unwrap();
        assert_eq!(config.install_dir, PathBuf::from("/srv/profiles"));
        assert!(config.default_db.is_none());
    }
}
