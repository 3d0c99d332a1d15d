//! Mojave command-line tools.
//!
//! Validate, inspect and reformat pipeline configuration documents, and
//! dry-run the pipeline wiring (logging plus components) they describe.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mojave_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "mojave", about = "Mojave pipeline configuration tools", version)]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Require field names spelled exactly as documented (e.g. reject `concurrencylevel`)
    #[arg(long, global = true)]
    exact_keys: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a configuration file and report what it defines
    Check {
        /// Configuration file (config.js)
        file: PathBuf,
    },

    /// Show the typed configuration (credentials redacted)
    Show {
        /// Configuration file (config.js)
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the canonical form of a configuration file
    Fmt {
        /// Configuration file (config.js)
        file: PathBuf,

        /// Rewrite the file in place instead of printing it
        #[arg(short, long)]
        write: bool,
    },

    /// Print the flattened key=value view of a configuration file
    Properties {
        /// Configuration file (config.js)
        file: PathBuf,

        /// Only keys under this dotted prefix (e.g. sources.ZeroMQSource)
        #[arg(short, long)]
        section: Option<String>,

        /// Show connection string passwords
        #[arg(long)]
        reveal: bool,
    },

    /// Initialize logging and build every component without connecting
    Plan {
        /// Configuration file (config.js)
        file: PathBuf,
    },
}

fn run_command(cli: Cli) -> Result<()> {
    let options = cli::load_options(cli.exact_keys);
    match cli.command {
        Commands::Check { file } => cli::check::run(&file, &options),
        Commands::Show { file, json } => cli::show::run(&file, &options, json),
        Commands::Fmt { file, write } => cli::fmt::run(&file, &options, write),
        Commands::Properties {
            file,
            section,
            reveal,
        } => cli::properties::run(&file, section.as_deref(), reveal),
        Commands::Plan { file } => cli::plan::run(&file, &options, cli.verbose),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // `plan` installs logging from the document's own log4j section.
    if !matches!(cli.command, Commands::Plan { .. }) {
        if let Err(err) = init_logging(LogConfig {
            logging: None,
            verbose: cli.verbose,
        }) {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
        }
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
