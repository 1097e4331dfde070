//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::{style, Style};

#[derive(Clone, Copy)]
enum Level {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Level {
    fn tag(self) -> console::StyledObject<&'static str> {
        match self {
            Level::Ok => style("[OK]").green(),
            Level::Warn => style("[WARN]").yellow(),
            Level::Fail => style("[FAIL]").red(),
            Level::Info => style("[INFO]").cyan(),
        }
    }
}

fn step(ctx: &UiContext, level: Level, message: String) {
    if ctx.use_fancy_output() {
        let _ = match level {
            Level::Ok => cliclack::log::success(message),
            Level::Warn => cliclack::log::warning(message),
            Level::Fail => cliclack::log::error(message),
            Level::Info => cliclack::log::info(message),
        };
    } else {
        println!("  {} {}", level.tag(), console::strip_ansi_codes(&message));
    }
}

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
        println!();
    }
}

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    outro(ctx, Level::Ok, Style::new().green().bold(), message);
}

/// Display warning outro
pub fn outro_warn(ctx: &UiContext, message: &str) {
    outro(ctx, Level::Warn, Style::new().yellow().bold(), message);
}

fn outro(ctx: &UiContext, level: Level, color: Style, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(color.apply_to(message)).ok();
    } else {
        println!();
        println!("{} {}", level.tag(), message);
    }
}

/// Display a note/info box
pub fn note(ctx: &UiContext, title: &str, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::note(title, message).ok();
    } else {
        println!("{}: {}", style(title).bold(), message);
    }
}

/// Display a section header
pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Level::Ok, message.to_string());
}

pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Level::Ok, format!("{} ({})", message, style(detail).dim()));
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    step(ctx, Level::Warn, message.to_string());
}

pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    step(ctx, Level::Warn, format!("{} - {}", message, style(hint).dim()));
}

pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Level::Fail, format!("{}: {}", message, style(detail).red()));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Level::Info, message.to_string());
}

/// Display a remark/hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Print styled key-value with status color
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    if ctx.use_fancy_output() {
        let color = if ok {
            Style::new().green()
        } else {
            Style::new().yellow()
        };
        println!("  {}: {}", style(key).dim(), color.apply_to(value));
    } else {
        let level = if ok { Level::Ok } else { Level::Warn };
        println!("  {} {}: {}", level.tag(), key, value);
    }
}
