//! keeper-mobile - Keeper Mobile signer provider
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use keeper_mobile::cli::{Cli, Commands};
use keeper_mobile::config::{Config, ConfigManager};
use keeper_mobile::error::KeeperResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> KeeperResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // Logging format comes from the config, so load it first
    let config = config_manager.load().await?;
    init_logging(cli.verbose, &config);
    debug!("Loaded config from {}", config_manager.path().display());

    ConfigManager::ensure_state_dirs().await?;
    keeper_mobile::ui::init_theme();

    match cli.command {
        Commands::Status => keeper_mobile::cli::commands::status(&config).await,
        Commands::Config(args) => {
            keeper_mobile::cli::commands::config(args, &config, &config_manager).await
        }
        Commands::Forget(args) => keeper_mobile::cli::commands::forget(args).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("keeper_mobile=warn"),
        1 => EnvFilter::new("keeper_mobile=info"),
        _ => EnvFilter::new("keeper_mobile=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
