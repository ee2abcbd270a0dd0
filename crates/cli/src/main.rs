// jdfmerge - merge independently numbered JDF timetable batches into one dataset

mod batches;
mod exit_codes;
mod merge;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exit_codes::*;

#[derive(Parser)]
#[command(name = "jdfmerge")]
#[command(about = "Merge JDF bus timetable batches into a single consistent dataset")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/jdfmerge/jdfmerge.toml)
    #[arg(long, global = true, env = "JDFMERGE_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every batch of the source archive and write the output tables
    #[command(after_help = "\
Examples:
  jdfmerge merge
  jdfmerge merge --archive JDF.zip --stops stops.txt --out merged
  jdfmerge merge --date 2015-06-30 --report report.json
  jdfmerge merge --strict --json > report.json")]
    Merge(merge::MergeArgs),

    /// List the batches of the source archive with their schema version
    #[command(after_help = "\
Examples:
  jdfmerge batches
  jdfmerge batches --archive JDF.zip --json")]
    Batches {
        /// Container archive (overrides source.archive)
        #[arg(long)]
        archive: Option<PathBuf>,

        /// Print JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check the settings file and print the resolved settings
    #[command(after_help = "\
Examples:
  jdfmerge validate
  jdfmerge --config ./jdfmerge.toml validate")]
    Validate,
}

/// Error carried back to `main`: exit code, message and an optional hint.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Merge(args) => merge::cmd_merge(config, args),
        Commands::Batches { archive, json } => batches::cmd_batches(config, archive, json),
        Commands::Validate => settings::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("error: {}", e.message);
            }
            if let Some(hint) = e.hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}
