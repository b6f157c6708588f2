//! `shoebox`: ingest photographers' ZIP archives into photo storage and the
//! catalog.

mod command;
mod error;
mod output;
mod prompt;

use crate::error::ErrorKind;
use clap::{Parser, Subcommand};
use exn::ResultExt;
use shoebox_config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shoebox", version)]
#[command(about = "Batch ingestion of wedding photo archives", long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// More logging; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest every ZIP archive in a folder, deleting the ones that went through
    Ingest {
        /// Folder holding the archives [default: the configured inbox]
        folder: Option<PathBuf>,
        /// Category number (1-4) or name
        category: Option<String>,
        /// Recorded as the photographer on every photo
        #[arg(short, long)]
        uploader: Option<String>,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Ingest a single ZIP archive without deleting it
    Upload {
        zip: PathBuf,
        /// Category number (1-4) or name
        category: Option<String>,
        /// Recorded as the photographer on every photo
        uploader: Option<String>,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// List the photo categories
    Categories,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            if err.is_retryable() {
                eprintln!("This may succeed if you run it again.");
            }
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> error::Result<ExitCode> {
    if let Commands::Categories = cli.command {
        return Ok(command::categories());
    }
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Commands::Ingest { folder, category, uploader, yes } => {
            command::ingest_folder(&config, folder, category, uploader, yes).await
        },
        Commands::Upload { zip, category, uploader, yes } => {
            command::upload(&config, zip, category, uploader, yes).await
        },
        Commands::Categories => Ok(command::categories()),
    }
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Logs go to stderr so the report on stdout stays readable. `RUST_LOG` wins
/// over the command-line flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose, quiet)));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(0, false, "info")]
    #[case(1, false, "debug")]
    #[case(3, false, "trace")]
    #[case(0, true, "error")]
    fn test_log_level(#[case] verbose: u8, #[case] quiet: bool, #[case] expected: &str) {
        assert_eq!(log_level(verbose, quiet), expected);
    }

    #[test]
    fn test_parse_ingest() {
        let cli = Cli::parse_from(["shoebox", "-v", "ingest", "/srv/inbox", "3", "--uploader", "ana@example.com", "-y"]);
        assert_eq!(cli.verbose, 1);
        let Commands::Ingest { folder, category, uploader, yes } = cli.command else {
            panic!("expected the ingest command");
        };
        assert_eq!(folder, Some(PathBuf::from("/srv/inbox")));
        assert_eq!(category.as_deref(), Some("3"));
        assert_eq!(uploader.as_deref(), Some("ana@example.com"));
        assert!(yes);
    }

    #[test]
    fn test_parse_upload() {
        let cli = Cli::parse_from(["shoebox", "upload", "day-one.zip", "pre-wedding", "ana@example.com"]);
        let Commands::Upload { zip, category, uploader, yes } = cli.command else {
            panic!("expected the upload command");
        };
        assert_eq!(zip, PathBuf::from("day-one.zip"));
        assert_eq!(category.as_deref(), Some("pre-wedding"));
        assert_eq!(uploader.as_deref(), Some("ana@example.com"));
        assert!(!yes);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["shoebox", "-q", "-v", "categories"]).is_err());
    }
}
