//! Pairing prompt
//!
//! While a session proposal waits for the wallet, the pairing URI has to be
//! shown to the user (as a QR code or deep link). Dismissing the prompt
//! cancels the login.

use crate::ui::{self, TaskSpinner, UiContext};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{info, warn};

/// Surface for the pairing URI
#[async_trait]
pub trait PairingPrompt: Send + Sync {
    /// Show `uri`; the returned future completes when the user dismisses
    /// the prompt
    async fn open(&self, uri: &str);

    /// Hide the prompt once the wallet answered
    fn close(&self);
}

/// Logs the URI and never reports a dismissal
#[derive(Debug, Clone, Default)]
pub struct HeadlessPrompt;

#[async_trait]
impl PairingPrompt for HeadlessPrompt {
    async fn open(&self, uri: &str) {
        info!("Pair Keeper Mobile with: {}", uri);
        std::future::pending::<()>().await
    }

    fn close(&self) {}
}

/// Prints the URI to the terminal; Ctrl-C dismisses it
pub struct TerminalPrompt {
    ctx: UiContext,
    spinner: Mutex<Option<TaskSpinner>>,
}

impl TerminalPrompt {
    pub fn new(ctx: UiContext) -> Self {
        Self {
            ctx,
            spinner: Mutex::new(None),
        }
    }

    fn set_spinner(&self, spinner: Option<TaskSpinner>) -> Option<TaskSpinner> {
        let mut slot = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *slot, spinner)
    }
}

#[async_trait]
impl PairingPrompt for TerminalPrompt {
    async fn open(&self, uri: &str) {
        ui::note(&self.ctx, "Scan with Keeper Mobile", uri);

        let mut spinner = TaskSpinner::new(&self.ctx);
        spinner.start("Waiting for approval in Keeper Mobile (Ctrl-C to cancel)...");
        self.set_spinner(Some(spinner));

        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C, pairing can only end in the wallet: {}", e);
            std::future::pending::<()>().await;
        }

        if let Some(mut spinner) = self.set_spinner(None) {
            spinner.stop_error("Pairing cancelled");
        }
    }

    fn close(&self) {
        if let Some(mut spinner) = self.set_spinner(None) {
            spinner.stop("Keeper Mobile answered");
        }
    }
}
