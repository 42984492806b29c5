//! `loxc` - command-line entry point.
//!
//! ```text
//! loxc <file> <tokenize|parse|evaluate|run> [--verbose] [--no-color]
//! ```

use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand};
use loxc_drv::{Command, Config, Session};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// loxc - a tree-walking interpreter
#[derive(ClapParser, Debug)]
#[command(name = "loxc")]
#[command(author = "Fax Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tokenize, parse, evaluate, or run a source file", long_about = None)]
struct Cli {
    /// Source file to process
    file: PathBuf,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true, env = "LOXC_VERBOSE")]
    verbose: bool,

    /// Disable color output
    #[arg(long, global = true, env = "LOXC_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every token, one per line
    Tokenize,
    /// Print the rendered form of each parsed expression
    Parse,
    /// Print the evaluated value of each top-level expression
    Evaluate,
    /// Execute the file for its side effects
    Run,
}

impl From<Commands> for Command {
    fn from(value: Commands) -> Self {
        match value {
            Commands::Tokenize => Command::Tokenize,
            Commands::Parse => Command::Parse,
            Commands::Evaluate => Command::Evaluate,
            Commands::Run => Command::Run,
        }
    }
}

fn init_logging(verbose: bool, no_color: bool) -> anyhow::Result<()> {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };

    let subscriber = fmt::layer()
        .with_ansi(!no_color)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color)?;

    let config = Config {
        path: cli.file,
        command: cli.command.into(),
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    let exit_code = Session::new(config).run()?;
    std::process::exit(exit_code);
}
