//! Default usage renderer.
//!
//! Output layout:
//!
//! ```text
//! Usage of greet:
//!   Print a greeting.
//!
//!   -help
//!     	show this help message
//!   -name string
//!     	who to greet (required)
//!   -count int
//!     	how many times (default 1)
//! ```

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};

use crate::registry::{FlagDescriptor, Registry};

/// Custom usage function; replaces the default renderer entirely.
pub type UsageFn = Box<dyn Fn(&Registry, &mut dyn Write) -> io::Result<()>>;

/// Whether the default renderer adds terminal colors.
///
/// Colored output still honors `NO_COLOR` / `CLICOLOR` through
/// [`colored::control`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageStyle {
    /// Plain text.
    #[default]
    Plain,
    /// ANSI-colored flag names, types and markers.
    Colored,
}

impl UsageStyle {
    fn paint(self, text: &str, color: fn(&str) -> ColoredString) -> String {
        match self {
            UsageStyle::Plain => text.to_string(),
            UsageStyle::Colored => color(text).to_string(),
        }
    }
}

/// Writes the default usage text for `registry`.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn render_default(
    name: &str,
    description: &str,
    registry: &Registry,
    style: UsageStyle,
    out: &mut dyn Write,
) -> io::Result<()> {
    let header = format!("Usage of {name}:");
    writeln!(out, "{}", style.paint(&header, |s| s.bold()))?;
    if !description.is_empty() {
        for line in description.lines() {
            writeln!(out, "  {line}")?;
        }
        writeln!(out)?;
    }
    for flag in registry.iter() {
        render_flag(flag, style, out)?;
    }
    Ok(())
}

fn render_flag(flag: &FlagDescriptor, style: UsageStyle, out: &mut dyn Write) -> io::Result<()> {
    let value = flag.value();
    let mut heading = format!("  {}", style.paint(&flag.show_flag(), |s| s.green().bold()));
    if !value.is_bool_flag() {
        heading.push(' ');
        heading.push_str(&style.paint(value.type_name(), |s| s.cyan()));
    }
    writeln!(out, "{heading}")?;

    let mut detail = flag.description().to_string();
    if let Some(default) = value.default_text() {
        if value.type_name() == "string" {
            detail.push_str(&format!(" (default {default:?})"));
        } else {
            detail.push_str(&format!(" (default {default})"));
        }
    }
    if flag.is_required() {
        detail.push(' ');
        detail.push_str(&style.paint("(required)", |s| s.red()));
    }
    writeln!(out, "    \t{}", detail.trim_start())
}
