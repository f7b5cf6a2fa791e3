//! CLI argument parsing with subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Telegram moderation bot that removes crypto addresses during admin-set
/// block windows.
#[derive(Parser)]
#[command(name = "ca-blocker")]
#[command(about = "Telegram bot that blocks crypto address sharing on demand")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot
    Bot,

    /// Check text for crypto addresses (reads stdin when no text is given)
    Check {
        /// Text to check
        text: Option<String>,
    },

    /// Show current configuration status
    Status,
}
