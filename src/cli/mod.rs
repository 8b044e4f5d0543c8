pub mod args;
pub mod output;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Spinner shown on stderr while a blocking scan runs
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg} {elapsed:.dim}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Ask a yes/no question on stdout; anything but `y` is a no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("\n  {} {} [y/N] ", "❓", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let yes = input.trim().eq_ignore_ascii_case("y");
    if !yes {
        println!("  {} Cancelled", "✗".red());
    }
    Ok(yes)
}
