use crate::config::{DB_DIR_ENV, DB_ENV};
use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gprofview")]
#[command(about = "Browser-based viewer for gprof call-graph databases")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Where bare database names are looked up
#[derive(Args, Debug, Clone)]
pub struct DbDirArgs {
    /// Directory holding the databases (defaults to the executable's directory)
    #[arg(long, env = DB_DIR_ENV)]
    pub db_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the viewer over HTTP
    Serve {
        /// Database shown when a request names none
        #[arg(long, env = DB_ENV)]
        db: Option<PathBuf>,

        #[command(flatten)]
        dir: DbDirArgs,

        /// Address to bind
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, short = 'p', default_value = "5000")]
        port: u16,
    },

    /// Answer a single CGI request (QUERY_STRING in, headers and page out)
    Cgi {
        #[command(flatten)]
        dir: DbDirArgs,
    },

    /// Print analytics for a profile database
    Report(ReportArgs),

    /// List gprof databases in a directory
    List {
        /// Directory to search (defaults to current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Profile database file
    pub file: PathBuf,

    /// Run only the standard sections, ignoring other section flags
    /// (default when no section is chosen)
    #[arg(long)]
    pub all: bool,

    /// Whole-table statistics
    #[arg(long)]
    pub stats: bool,

    /// Top N CPU consumers
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Functions with self time above THRESHOLD
    #[arg(long, value_name = "THRESHOLD")]
    pub self_time: Option<f64>,

    /// Top N functions by children time
    #[arg(long, value_name = "N")]
    pub children: Option<usize>,

    /// Functions whose name contains PATTERN
    #[arg(long, value_name = "PATTERN")]
    pub search: Option<String>,

    /// Entries that are part of call cycles
    #[arg(long)]
    pub cycles: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(threshold) = self.self_time
            && (!threshold.is_finite() || threshold < 0.0)
        {
            return Err(format!(
                "Self-time threshold must be a non-negative number, got {}",
                threshold
            ));
        }
        if self.top == Some(0) || self.children == Some(0) {
            return Err("Row counts must be at least 1".to_string());
        }
        Ok(())
    }

    /// True when no section flag was given
    pub fn wants_defaults(&self) -> bool {
        !self.stats
            && self.top.is_none()
            && self.self_time.is_none()
            && self.children.is_none()
            && self.search.is_none()
            && !self.cycles
    }
}
