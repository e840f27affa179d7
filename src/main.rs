use anyhow::Context;
use clap::Parser;
use gprofview::cli::{Cli, Command};
use gprofview::commands;
use gprofview::config::ViewerConfig;
use gprofview::error::exit_code;
use std::net::SocketAddr;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Registry, prelude::*};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(viewer_err) = e.downcast_ref::<gprofview::Error>() {
                ExitCode::from(viewer_err.exit_code() as u8)
            } else {
                ExitCode::from(exit_code::GENERAL_ERROR as u8)
            }
        }
    }
}

/// Log to stderr so CGI and report output on stdout stay clean
fn init_tracing(default_level: LevelFilter) {
    let registry = Registry::default().with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(
                EnvFilter::builder()
                    .with_default_directive(default_level.into())
                    .from_env_lossy(),
            ),
    );
    registry.init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Some(Command::Serve { .. }) => LevelFilter::INFO,
        _ => LevelFilter::WARN,
    };
    init_tracing(default_level);

    match cli.command {
        Some(Command::Serve {
            db,
            dir,
            host,
            port,
        }) => {
            let config = ViewerConfig::resolve(dir.db_dir)?.with_default_db(db);
            commands::serve::run(config, SocketAddr::new(host, port))?;
        }
        Some(Command::Cgi { dir }) => {
            let config = ViewerConfig::resolve(dir.db_dir)?;
            commands::cgi::run(&config)?;
        }
        Some(Command::Report(args)) => {
            commands::report::run(&args)
                .with_context(|| format!("Cannot report on {}", args.file.display()))?;
        }
        Some(Command::List { dir }) => {
            commands::list::run(dir.as_deref())?;
        }
        Some(Command::Completions { shell }) => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "gprofview", &mut std::io::stdout());
        }
        None if commands::cgi::is_cgi_request() => {
            let db_dir = std::env::var_os(gprofview::config::DB_DIR_ENV).map(Into::into);
            let config = ViewerConfig::resolve(db_dir)?;
            commands::cgi::run(&config)?;
        }
        None => {
            return Err(gprofview::Error::InvalidArgument(
                "no command given; run with --help to see the available commands".to_string(),
            )
            .into());
        }
    }

    Ok(())
}
