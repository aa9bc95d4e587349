//! Cadence CLI - resolve backup schedules and resource defaults.
//!
//! Provides commands to resolve Schedule manifests, inspect jitter and check
//! the configured global defaults.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use cadence_core::config::{self, Config};
use cadence_core::error::CadenceError;
use cadence_core::resources::GlobalDefaults;
use cadence_core::telemetry;
use clap::{Parser, Subcommand};

use commands::{defaults, jitter, resolve};
use output::OutputFormat;

/// Cadence - deterministic schedule resolution
#[derive(Parser)]
#[command(
    name = "cadence",
    version,
    about = "Cadence - deterministic schedule and resource resolution",
    long_about = "Expands random schedule macros into stable cron expressions and merges \
                  job resources with schedule templates and global defaults.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Configuration file layered under BACKUP_* environment variables
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve Schedule manifests
    Resolve(resolve::ResolveArgs),

    /// Show the jitter slots for an object identity
    Jitter(jitter::JitterArgs),

    /// Validate and show the global resource defaults
    Defaults,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    Ok(config)
}

/// Validates the whole configuration, then installs logging.
fn init(config: &Config) -> Result<GlobalDefaults> {
    let defaults = config.validate_syntax()?;
    telemetry::init_logging(&config.logging)?;
    telemetry::describe_metrics();
    Ok(defaults)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let global = init(&config)?;

    let format = cli.output;
    match cli.command {
        Commands::Jitter(args) => jitter::execute(args, format),
        Commands::Resolve(args) => resolve::execute(args, global, format),
        Commands::Defaults => defaults::execute(&global, format),
    }
}

/// 78 (EX_CONFIG) for fatal configuration errors, 1 otherwise.
fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<CadenceError>() {
        Some(e) if e.is_fatal() => 78,
        _ => 1,
    }
}

fn main() {
    config::load_dotenv();
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        if let Some(error) = e.downcast_ref::<CadenceError>() {
            error.log();
        }
        output::print_error(&format!("{:#}", e));
        std::process::exit(exit_code(&e));
    }
}
