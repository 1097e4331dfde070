//! Status command - show network, relay and persisted session

use crate::chain::{chain_id, network_code};
use crate::config::{Config, ConfigManager};
use crate::error::KeeperResult;
use crate::storage::{FileStore, KeyValueStore, LAST_TOPIC_KEY};
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(config: &Config) -> KeeperResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Keeper Mobile Provider Status");

    ui::section(&ctx, "Network");
    let byte = config.network.network_byte;
    ui::key_value(
        &ctx,
        "Network byte",
        &format!("{} ('{}')", byte, network_code(byte)),
    );
    ui::key_value(&ctx, "Chain", &chain_id(byte));
    ui::key_value(&ctx, "Node", &config.network.node_url);

    ui::section(&ctx, "Relay");
    ui::key_value(&ctx, "Relay URL", &config.relay.relay_url);
    let has_project = !config.relay.project_id.is_empty();
    ui::key_value_status(
        &ctx,
        "Project ID",
        if has_project {
            config.relay.project_id.as_str()
        } else {
            "not set"
        },
        has_project,
    );

    ui::section(&ctx, "Session");
    let store = FileStore::new();
    match store.get_item(LAST_TOPIC_KEY)? {
        Some(topic) => ui::key_value_status(&ctx, "Last topic", &topic, true),
        None => ui::key_value_status(&ctx, "Last topic", "none", false),
    }
    ui::key_value(&ctx, "Storage", &store.path().display().to_string());
    ui::key_value(
        &ctx,
        "Audit log",
        &if config.general.audit_log {
            ConfigManager::audit_log_path().display().to_string()
        } else {
            "disabled".to_string()
        },
    );

    if has_project {
        ui::outro_success(&ctx, "Ready to pair");
    } else {
        ui::outro_warn(&ctx, "Set relay.project_id before pairing");
    }

    Ok(())
}
