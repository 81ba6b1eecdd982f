//! Terminal rendering helpers

use colored::Colorize;
use serde::Serialize;

const BAR_WIDTH: usize = 40;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bright_white().bold());
    println!("{}", "━".repeat(title.chars().count().max(24)).bright_green());
}

/// Horizontal bar proportional to `value / max`
pub fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = ((value as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(width)
}

pub fn print_metric(label: &str, value: impl std::fmt::Display) {
    println!(
        "{} {}",
        format!("{:<28}", label).bright_white(),
        value.to_string().bright_cyan().bold()
    );
}

pub fn print_notice(message: &str) {
    println!("{}", message.bright_yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5, 10).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(0, 10), "");
    }
}
