//! Forget command - drop the persisted session topic

use crate::cli::args::ForgetArgs;
use crate::error::KeeperResult;
use crate::storage::{FileStore, KeyValueStore, LAST_TOPIC_KEY};
use crate::ui::{self, UiContext};
use tracing::info;

/// Execute the forget command
pub async fn execute(args: ForgetArgs) -> KeeperResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    forget(&ctx, &FileStore::new()).await
}

async fn forget(ctx: &UiContext, store: &dyn KeyValueStore) -> KeeperResult<()> {
    let Some(topic) = store.get_item(LAST_TOPIC_KEY)? else {
        ui::step_info(ctx, "No persisted session");
        return Ok(());
    };

    let prompt = format!("Forget session {}?", topic);
    if !ui::confirm(ctx, &prompt, false).await? {
        ui::step_warn(ctx, "Kept persisted session");
        return Ok(());
    }

    store.remove_item(LAST_TOPIC_KEY)?;
    info!("Forgot session topic {}", topic);
    ui::step_ok(ctx, "Persisted session forgotten");
    Ok(())
}
