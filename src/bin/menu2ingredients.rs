//! Command-line entry point for the menu2ingredients service.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use menu2ingredients::{process_ocr_text, AppState, Clients, ServiceConfig};
use std::io::Read;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "menu2ingredients",
    version,
    about = "Extract dishes and ingredients from restaurant-menu OCR text",
    long_about = "Reconciles a recipe-search database with a chat-completion model to \
                  turn raw menu OCR text into deduplicated, confidence-scored \
                  ingredient lists. Runs as an HTTP API or as a one-shot CLI."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve,

    /// Process one OCR text file and print the JSON result
    Analyze {
        /// Path to a text file, or `-` for stdin
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    if config.spoonacular_api_key.is_none() {
        warn!("SPOONACULAR_API_KEY not set; recipe lookups will return empty results");
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set; model calls will return default results");
    }

    let clients = Clients::from_config(&config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            menu2ingredients::serve(AppState::new(clients, config))
                .await
                .context("server terminated")?;
        }
        Command::Analyze { input } => {
            let ocr_text = read_input(&input)?;
            let trimmed = ocr_text.trim();
            anyhow::ensure!(!trimmed.is_empty(), "input contains no text");

            let output = process_ocr_text(&clients, trimmed).await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("menu2ingredients={default}"))),
        )
        .init();
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}
