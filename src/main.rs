//! Main entry point for the dataset translation agent CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod codegen;
mod core;
mod hub;
mod processors;

use cli::commands::Commands;

/// hret-agent - Hugging Face dataset Korean translation pipeline
#[derive(Parser, Debug)]
#[command(name = "hret-agent", version, about, long_about = None)]
struct Args {
    /// API key for the completion backend (defaults to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    let log_level = if std::env::var("RUST_LOG").is_ok() {
        std::env::var("RUST_LOG").unwrap()
    } else {
        "info".to_string()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_PKG_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Override config with CLI args if provided
    if let Some(api_key) = args.api_key {
        std::env::set_var("OPENAI_API_KEY", api_key);
    }

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    // Execute command
    match args.command {
        Some(Commands::Run {
            dataset,
            subset,
            split,
            push,
            pr,
            output_dir,
        }) => {
            cli::commands::handle_run(dataset, subset, split, push, pr, output_dir).await?;
        }
        Some(Commands::Subsets { dataset }) => {
            cli::commands::handle_subsets(dataset).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
