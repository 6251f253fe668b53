//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dimmed status line to stderr.
pub fn status(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render a completion percentage as a fixed width bar.
pub fn progress_bar(percent: u8) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(percent.min(100)) * WIDTH / 100;
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled).green(),
        "░".repeat(WIDTH - filled).dimmed(),
        percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_width() {
        colored::control::set_override(false);
        assert_eq!(progress_bar(0), format!("{}   0%", "░".repeat(20)));
        assert_eq!(progress_bar(50), format!("{}{}  50%", "█".repeat(10), "░".repeat(10)));
        assert_eq!(progress_bar(100), format!("{} 100%", "█".repeat(20)));
    }
}
