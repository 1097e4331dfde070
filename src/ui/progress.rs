//! Spinner with CI fallback

use super::context::UiContext;
use console::style;

/// A task spinner; prints plain lines when the terminal is not interactive
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(message),
            None if self.interactive => println!("{} {}", style("✓").green(), message),
            None => println!("{} {}", style("[OK]").green(), message),
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None if self.interactive => println!("{} {}", style("✗").red(), message),
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}
