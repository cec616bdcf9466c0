//! prevue - live preview for TSX/JSX components.

mod actor;
mod cli;
mod config;
mod core;
mod document;
mod embed;
mod executor;
mod logger;
mod pipeline;
mod preview;
mod reload;
mod runtime;
mod source;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PreviewConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PreviewConfig::load(&cli)?;

    match &cli.command {
        Commands::Serve { .. } => cli::serve::bind_server(&config)?.run(),
        Commands::Render { output, cycle } => {
            cli::render::render_document(&config, output.as_deref(), *cycle)
        }
        Commands::Check { json, watch } => {
            if !cli::check::check_preview(&config, *json, *watch)? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
