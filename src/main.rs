//! scxmlkit - Command-line tool for SCXML documents
//!
//! Formats, checks, inspects and converts state-chart documents.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scxmlkit")]
#[command(about = "Build, inspect, format and convert SCXML state-chart documents")]
#[command(version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true, env = config::CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Indentation: a number of spaces, or a literal string
    #[arg(long, global = true)]
    indent: Option<String>,

    /// Write single-line output
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a document and write it back in canonical form
    Fmt {
        /// Input document ("-" for stdin)
        file: PathBuf,

        /// Only report whether the file is already formatted
        #[arg(long)]
        check: bool,

        /// Write the result here instead of stdout
        #[arg(short, long, conflicts_with = "check")]
        output: Option<PathBuf>,
    },

    /// Report dangling and duplicate state references
    Check {
        /// Input document ("-" for stdin)
        file: PathBuf,
    },

    /// Verify that the document survives a serialize/parse round-trip
    Roundtrip {
        /// Input document ("-" for stdin)
        file: PathBuf,
    },

    /// Summarize a document
    Info {
        /// Input document ("-" for stdin)
        file: PathBuf,
    },

    /// Print the document model as JSON
    Dump {
        /// Input document ("-" for stdin)
        file: PathBuf,
    },

    /// Convert a JSON document model to markup
    FromJson {
        /// JSON model ("-" for stdin)
        file: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).map_err(|e| {
        eprintln!("{}: {}", "Config error".red(), e);
        e
    })?;
    if let Some(ref indent) = cli.indent {
        config.format.indent = config::parse_indent(indent);
    }
    if cli.compact {
        config.format.pretty = false;
    }

    match commands::execute(&config, cli.command) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}
