//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{KeeperError, KeeperResult};
use crate::ui::{self, UiContext};

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> KeeperResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> KeeperResult<()> {
    let toml = toml::to_string_pretty(config)?;
    println!("{}", toml);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> KeeperResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

/// Apply a dot-separated key to a config value
fn apply(config: &mut Config, key: &str, value: &str) -> KeeperResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,
        ["general", "audit_log"] => config.general.audit_log = parse_bool(value)?,

        ["network", "network_byte"] => config.network.network_byte = parse_network_byte(value)?,
        ["network", "node_url"] => config.network.node_url = value.to_string(),

        ["relay", "relay_url"] => config.relay.relay_url = value.to_string(),
        ["relay", "project_id"] => config.relay.project_id = value.to_string(),
        ["relay", "log_level"] => config.relay.log_level = value.to_string(),

        ["metadata", "name"] => config.metadata.name = value.to_string(),
        ["metadata", "description"] => config.metadata.description = value.to_string(),
        ["metadata", "url"] => config.metadata.url = value.to_string(),
        ["metadata", "icons"] => {
            config.metadata.icons = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        ["signing", "verify_signatures"] => config.signing.verify_signatures = parse_bool(value)?,
        ["signing", "calculate_fees"] => config.signing.calculate_fees = parse_bool(value)?,

        _ => return Err(KeeperError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> KeeperResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    if let Err(e) = apply(&mut config, key, value) {
        ui::step_error_detail(&ctx, "Cannot set config value", &e.to_string());
        ui::remark(&ctx, "Valid keys:");
        print_valid_keys();
        return Err(e);
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

fn parse_bool(value: &str) -> KeeperResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(KeeperError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_log_format(value: &str) -> KeeperResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(KeeperError::User(format!(
            "Invalid log format: {}. Use text/json",
            value
        ))),
    }
}

/// Accept a numeric byte (`84`) or a network code (`T`)
fn parse_network_byte(value: &str) -> KeeperResult<u8> {
    if let Ok(byte) = value.parse::<u8>() {
        return Ok(byte);
    }
    match value.as_bytes() {
        [code] if code.is_ascii_alphabetic() => Ok(*code),
        _ => Err(KeeperError::User(format!(
            "Invalid network byte: {}. Use a number or a single letter (W, T, S)",
            value
        ))),
    }
}

fn print_valid_keys() {
    let keys = [
        "general.log_format",
        "general.audit_log",
        "network.network_byte",
        "network.node_url",
        "relay.relay_url",
        "relay.project_id",
        "relay.log_level",
        "metadata.name",
        "metadata.description",
        "metadata.url",
        "metadata.icons",
        "signing.verify_signatures",
        "signing.calculate_fees",
    ];

    for key in keys {
        eprintln!("  {}", key);
    }
}
