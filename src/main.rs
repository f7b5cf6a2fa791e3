//! CA blocker - CLI entry point.
//!
//! Provides subcommands to run the bot, check text offline and show the
//! configuration state.

use anyhow::{Context, Result};
use ca_blocker::cli::{Cli, Commands};
use ca_blocker::config::{mask_token, Config};
use ca_blocker::{bot, classifier};
use clap::Parser;
use std::io::{self, Read};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bot => {
            let config = Config::load(cli.config).context("Failed to load configuration")?;
            bot::run(config).await.context("Failed to run Telegram bot")?;
        }
        Commands::Check { text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            return Ok(print_check(&text));
        }
        Commands::Status => {
            print_status(cli.config);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print the addresses found in `text`. Fails when there are none.
fn print_check(text: &str) -> ExitCode {
    let addresses = classifier::find_addresses(text);
    if addresses.is_empty() {
        println!("✅ No crypto addresses found");
        return ExitCode::FAILURE;
    }

    println!("🚫 Found {} crypto address(es):", addresses.len());
    for address in addresses {
        println!("   {}", address);
    }
    ExitCode::SUCCESS
}

/// Print configuration status.
fn print_status(config_path: Option<std::path::PathBuf>) {
    println!("📊 CA Blocker Status\n");

    match Config::load(config_path) {
        Ok(config) => {
            println!("✅ Configuration: Found");
            println!("   Source: {}", config.source);
            println!("   Token: {}", mask_token(&config.bot_token));
            println!("   Gate scope: {}", config.gate_scope);
        }
        Err(e) => {
            println!("❌ Configuration: Not found or invalid");
            println!("   Error: {}", e);
            println!();
            println!("Create config at ~/.ca-blocker/config.json:");
            println!(r#"  {{"bot_token": "...", "gate_scope": "chat"}}"#);
            println!("or set BOT_TOKEN in the environment or a .env file.");
        }
    }
}
