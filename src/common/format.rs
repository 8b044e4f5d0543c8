use colored::*;

use crate::forecast::alerts;
use crate::scanner::targets::RiskTier;

const UNITS: [(&str, u64); 4] = [
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
];

/// Human-readable size in binary units: two decimals from MB up, one for KB
pub fn format_size(bytes: u64) -> String {
    match UNITS.iter().find(|(_, scale)| bytes >= *scale) {
        Some(&(unit, scale)) => {
            let precision = if unit == "KB" { 1 } else { 2 };
            format!("{:.*} {}", precision, bytes as f64 / scale as f64, unit)
        }
        None => format!("{} B", bytes),
    }
}

/// Reclaimable amounts worth acting on stand out
pub fn format_size_colored(bytes: u64) -> ColoredString {
    let text = format_size(bytes);
    match bytes {
        b if b >= 10 << 30 => text.red().bold(),
        b if b >= 1 << 30 => text.yellow().bold(),
        b if b >= 100 << 20 => text.yellow(),
        _ => text.normal(),
    }
}

/// Growth per day, negative when usage shrinks
pub fn format_rate(bytes_per_day: i64) -> String {
    let sign = if bytes_per_day < 0 { "-" } else { "" };
    format!("{}{}/day", sign, format_size(bytes_per_day.unsigned_abs()))
}

/// Format a count with a singular/plural noun
pub fn format_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Display a path with the home prefix shortened to `~`
pub fn format_path(path: &std::path::Path) -> String {
    match dirs::home_dir() {
        Some(home) => shorten_home(path, &home),
        None => path.display().to_string(),
    }
}

fn shorten_home(path: &std::path::Path, home: &std::path::Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

/// Scan durations: milliseconds under a second, minutes past sixty
pub fn format_duration(secs: f64) -> String {
    match secs {
        s if s < 1.0 => format!("{:.0}ms", s * 1000.0),
        s if s < 60.0 => format!("{:.1}s", s),
        s => {
            let whole = s.round() as u64;
            format!("{}m {}s", whole / 60, whole % 60)
        }
    }
}

/// Disk fill bar, colored by the alert level the fill would raise
pub fn usage_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let percent = (fraction * 100.0) as u8;
    let used = "━".repeat(filled);
    let used = match percent {
        p if p >= alerts::CRITICAL_PERCENT => used.red(),
        p if p >= alerts::WARNING_PERCENT => used.yellow(),
        _ => used.green(),
    };
    format!("{}{}", used, "━".repeat(width - filled).truecolor(80, 80, 80))
}

/// Colorize a risk tier
pub fn format_risk(tier: RiskTier) -> ColoredString {
    match tier {
        RiskTier::Safe => "Safe".green(),
        RiskTier::Caution => "Caution".yellow(),
        RiskTier::Risky => "Risky".red().bold(),
    }
}

/// Blank-line padded, underlined section title
pub fn print_header(title: &str) {
    println!("\n{}\n", title.bold().underline());
}

/// One indented `key: value` line with a dimmed key
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Cut to at most `max_chars` characters, marking the cut with `...`
pub fn truncate(s: &str, max_chars: usize) -> String {
    let Some((cut, _)) = s.char_indices().nth(max_chars) else {
        return s.to_string();
    };
    let keep = max_chars.saturating_sub(3);
    let head = s.char_indices().nth(keep).map(|(i, _)| i).unwrap_or(cut);
    let dots = max_chars - keep;
    format!("{}{}", &s[..head], &"..."[..dots])
}
