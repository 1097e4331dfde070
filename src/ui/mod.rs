//! Terminal output
//!
//! Uses `cliclack` for interactive prompts and falls back to plain tagged
//! lines (`[OK]`, `[WARN]`) in CI or when stdout is not a terminal.
//!
//! ```rust,ignore
//! use keeper_mobile::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//! ui::note(&ctx, "Scan with Keeper Mobile", &uri);
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Waiting for approval...");
//! spinner.stop("Keeper Mobile answered");
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, note, outro_success, outro_warn, remark, section,
    step_error_detail, step_info, step_ok, step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;
pub use theme::{init_theme, KeeperTheme};
