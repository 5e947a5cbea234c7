//! uilocator CLI - find elements in a captured UI tree by recognition string

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uilocator::{locate, parse_report, LocateRequest, Lookup};
use uilocator_core::config::Config;

#[derive(Parser)]
#[command(name = "uilocator")]
#[command(about = "Locate UI elements by recognition string")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a recognition string and print its levels
    Parse {
        /// Recognition string, e.g. "Type=Window;\;Type=PushButton;Caption=OK"
        recognition: String,
    },
    /// Locate an element and print it with its match counters
    Locate(LocateArgs),
    /// Print whether an element exists
    Exists(LocateArgs),
}

#[derive(Args)]
struct LocateArgs {
    /// JSON snapshot of the element tree
    #[arg(long, value_name = "FILE")]
    tree: PathBuf,

    /// Recognition string of the top-level element
    #[arg(long)]
    root: String,

    /// Recognition string of a descendant of the root
    #[arg(long)]
    child: Option<String>,

    /// Seconds to keep polling
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Search once instead of polling
    #[arg(long)]
    single_pass: bool,
}

impl From<LocateArgs> for LocateRequest {
    fn from(args: LocateArgs) -> Self {
        Self {
            tree: args.tree,
            root: args.root,
            child: args.child,
            timeout_secs: args.timeout,
            single_pass: args.single_pass,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Parse { recognition } => {
            let levels = parse_report(&recognition)?;
            println!("{}", serde_json::to_string_pretty(&levels)?);
            Ok(())
        }
        Commands::Locate(args) => {
            let config = load_config(cli.config.as_deref())?;
            match locate(&args.into(), &config)? {
                Lookup::Found(report) => {
                    info!(path = %report.element.path, "Element located");
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                Lookup::Missing(not_found) => Err(not_found.into_error().into()),
            }
        }
        Commands::Exists(args) => {
            let config = load_config(cli.config.as_deref())?;
            let exists = matches!(locate(&args.into(), &config)?, Lookup::Found(_));
            println!("{exists}");
            Ok(())
        }
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "uilocator={level},uilocator_core={level},uilocator_engine={level}"
        ))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match Config::load(path) {
        Ok(config) => config,
        Err(e) if path.is_none() => {
            warn!("Falling back to default configuration: {e}");
            Config::default()
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };
    config.validate()?;
    Ok(config)
}
