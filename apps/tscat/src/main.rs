//! # tscat - Qt Linguist Catalog Tool
//!
//! The main binary for inspecting and compiling `.ts` translation catalogs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              apps/tscat (THE BINARY)         │
//! │                                              │
//! │   ┌─────────────┐        ┌──────────────┐    │
//! │   │    CLI      │        │    Config    │    │
//! │   │   (clap)    │        │ (toml + env) │    │
//! │   └──────┬──────┘        └──────┬───────┘    │
//! │          └────────────┬─────────┘            │
//! │                       ▼                      │
//! │               ┌───────────────┐              │
//! │               │  tscat-core   │              │
//! │               │ (THE LOGIC)   │              │
//! │               └───────────────┘              │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! tscat -C dustrac-game_fi.ts stats
//! tscat -C dustrac-game_fi.ts lookup -c MainMenu Play
//! tscat -C dustrac-game_fi.ts check --json
//! tscat -C dustrac-game_fi.ts compile -o dustrac-game_fi.tsc
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() -> ExitCode {
    let cli = tscat::cli::Cli::parse();

    // TSCAT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("TSCAT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "tscat=debug,tscat_core=debug"
    } else {
        "tscat=info,tscat_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let mut stdout = std::io::stdout().lock();
    match tscat::cli::execute(cli, &mut stdout) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
