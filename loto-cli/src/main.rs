mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::CliConfig;
use loto_core::{LotoEngine, LotoError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "loto")]
#[command(about = "Lottery combination generator and verifier")]
#[command(version)]
struct Cli {
    /// Data directory for the draw history
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON catalog replacing the built-in lotteries
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lottery rules
    #[command(subcommand)]
    Rules(commands::RulesCommands),

    /// Generate combinations or covering blocks
    #[command(subcommand)]
    Generate(commands::GenerateCommands),

    /// Verify combinations against the draw history
    #[command(subcommand)]
    Verify(commands::VerifyCommands),

    /// Draw history and proposal ledger
    #[command(subcommand)]
    History(commands::HistoryCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let defaults = CliConfig::default();
    let config = CliConfig {
        data_dir: cli.data_dir.unwrap_or(defaults.data_dir),
        catalog: cli.catalog,
        verbose: cli.verbose,
    };

    // Initialize logging
    let log_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "loto_core={},loto={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::debug!("Using data directory {}", config.data_dir.display());

    tokio::fs::create_dir_all(&config.data_dir).await?;

    let result = match LotoEngine::new(config.engine_config()).await {
        Ok(engine) => match cli.command {
            Commands::Rules(cmd) => commands::handle_rules_command(cmd, &engine).await,
            Commands::Generate(cmd) => commands::handle_generate_command(cmd, &engine).await,
            Commands::Verify(cmd) => commands::handle_verify_command(cmd, &engine).await,
            Commands::History(cmd) => commands::handle_history_command(cmd, &engine).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        match e {
            LotoError::NotFound { lottery_id } => {
                eprintln!("Error: Lottery '{}' not found", lottery_id);
                eprintln!("Use 'loto rules list' to see available lotteries");
            }
            LotoError::InvalidCombination(msg) => {
                eprintln!("Error: Invalid combination: {}", msg);
            }
            LotoError::GenerationExhausted {
                requested,
                available,
            } => {
                eprintln!("Error: Cannot generate {} combinations", requested);
                eprintln!("Only {} remain once history and proposals are excluded", available);
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
