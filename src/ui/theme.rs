//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Keeper blue for active prompts
#[derive(Debug, Clone, Default)]
pub struct KeeperTheme;

impl cliclack::Theme for KeeperTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().blue().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Submit => Style::new().green(),
            other => self.bar_color(other),
        }
    }
}

pub fn init_theme() {
    cliclack::set_theme(KeeperTheme);
}
