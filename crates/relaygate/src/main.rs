// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relaygate - a message gateway between group chat and the OpenAI API.
//!
//! This is the binary entry point for the Relaygate daemon.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod status;

/// Relaygate - a message gateway between group chat and the OpenAI API.
#[derive(Parser, Debug)]
#[command(name = "relaygate", version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file, bypassing the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Relaygate daemon.
    Serve,
    /// Show the effective configuration and gating ceilings.
    Status {
        /// Output structured JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration before anything else; diagnostics go
    // to stderr and the process exits non-zero on any config error.
    let loaded = match &cli.config {
        Some(path) => relaygate_config::load_and_validate_path(path),
        None => relaygate_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            relaygate_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.gateway.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        gateway = %config.gateway.name,
        default_model = %config.openai.default_model,
        "configuration loaded"
    );

    match cli.command {
        Some(Commands::Serve) => {
            // The platform adapter supplies the PresentationSink and message
            // feed; without one there is nothing to serve yet.
            println!("relaygate serve: no platform adapter configured");
        }
        Some(Commands::Status { json }) => {
            status::run_status(&config, json);
        }
        None => {
            println!("relaygate: use --help for available commands");
        }
    }
}
