use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a database selector could not be turned into a usable file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    Missing,
    NotAFile,
    Unreadable,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            NotFoundReason::Missing => "Database file not found",
            NotFoundReason::NotAFile => "Database path is not a file",
            NotFoundReason::Unreadable => "Database file is not readable",
        };
        f.write_str(message)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("No database selected. Choose a database file to view.")]
    MissingParameter,

    #[error("{reason}: {}", path.display())]
    NotFound {
        path: PathBuf,
        reason: NotFoundReason,
    },

    #[error("Failed to open database {}: {source}", path.display())]
    ConnectionFailure {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Table '{0}' not found in database")]
    MissingTable(&'static str),

    #[error("Query failed: {0}")]
    QueryFailure(#[from] rusqlite::Error),

    #[error("Cannot encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGUMENTS: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const DATABASE_ERROR: i32 = 6;
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingParameter | Error::InvalidArgument(_) => exit_code::INVALID_ARGUMENTS,
            Error::NotFound { .. } => exit_code::NOT_FOUND,
            Error::ConnectionFailure { .. } | Error::MissingTable(_) | Error::QueryFailure(_) => {
                exit_code::DATABASE_ERROR
            }
            Error::Io(_) | Error::Encode(_) => exit_code::GENERAL_ERROR,
        }
    }
}
