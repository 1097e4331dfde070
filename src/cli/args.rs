//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// keeper-mobile - Keeper Mobile signer provider
///
/// Inspect the configuration and persisted WalletConnect session used to
/// sign Waves transactions with Keeper Mobile.
#[derive(Parser, Debug)]
#[command(name = "keeper-mobile")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "KEEPER_MOBILE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show network, relay and persisted session
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Forget the persisted session topic
    Forget(ForgetArgs),
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Dot-separated key (e.g. network.network_byte)
        key: String,

        /// New value
        value: String,
    },
}

/// Arguments for the forget command
#[derive(Parser, Debug)]
pub struct ForgetArgs {
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}
