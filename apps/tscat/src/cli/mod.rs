//! # tscat CLI Module
//!
//! This module implements the CLI interface for tscat.
//!
//! ## Available Commands
//!
//! - `lookup` - Resolve one string the way the game would
//! - `list` - List catalog entries
//! - `stats` - Show translation progress
//! - `check` - Report every invariant violation
//! - `export` - Re-serialize the catalog (ts or json)
//! - `compile` - Write the compiled release form
//! - `prune` - Write the catalog without obsolete entries

mod commands;

use crate::config::{CATALOG_ENV, CONFIG_ENV, Config};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tscat_core::CatalogError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// tscat - Qt Linguist catalog tool
///
/// Looks up, validates and compiles `.ts` translation catalogs.
/// Missing and obsolete translations fall back to the source text.
#[derive(Parser, Debug)]
#[command(name = "tscat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the catalog (.ts or compiled)
    #[arg(short = 'C', long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Path to a tscat.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Do not resolve translations marked unfinished
    #[arg(long, global = true)]
    pub no_unfinished: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a source string in a context
    Lookup {
        /// Context name (e.g. MainMenu)
        #[arg(short, long)]
        context: String,

        /// Disambiguation comment
        #[arg(short, long)]
        disambiguation: Option<String>,

        /// Source text to translate
        source: String,
    },

    /// List catalog entries
    List {
        /// Only entries of this context
        #[arg(short, long)]
        context: Option<String>,

        /// Include obsolete and vanished entries
        #[arg(long)]
        retired: bool,
    },

    /// Show translation statistics
    Stats,

    /// Validate the catalog and report every problem
    Check,

    /// Re-serialize the catalog
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (ts, json)
        #[arg(short = 't', long, default_value = "ts")]
        format: String,
    },

    /// Compile the catalog into its binary release form
    Compile {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove obsolete and vanished entries
    Prune {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments, writing results to `out`.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<ExitCode, CatalogError> {
    let config = Config::discover(
        cli.config.as_deref(),
        std::env::var_os(CONFIG_ENV).map(PathBuf::from),
    )?;
    let settings = config.resolve(
        cli.catalog,
        std::env::var_os(CATALOG_ENV).map(PathBuf::from),
        cli.no_unfinished,
    )?;
    let json = cli.json;

    match cli.command {
        Some(Commands::Lookup {
            context,
            disambiguation,
            source,
        }) => cmd_lookup(
            &settings,
            &context,
            disambiguation.as_deref().unwrap_or(""),
            &source,
            json,
            out,
        ),
        Some(Commands::List { context, retired }) => {
            cmd_list(&settings, context.as_deref(), retired, json, out)
        }
        Some(Commands::Check) => cmd_check(&settings, json, out),
        Some(Commands::Export { output, format }) => {
            cmd_export(&settings, &output, &format, out)
        }
        Some(Commands::Compile { output }) => cmd_compile(&settings, &output, out),
        Some(Commands::Prune { output }) => cmd_prune(&settings, &output, out),
        Some(Commands::Stats) | None => {
            // No subcommand - show stats by default
            cmd_stats(&settings, json, out)
        }
    }
}
