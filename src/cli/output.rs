use colored::*;
use serde::Serialize;

use crate::cleaner::CleanReport;
use crate::common::format::{self, format_path, format_size, format_size_colored};
use crate::forecast::ForecastSummary;
use crate::monitor::MonitorSnapshot;
use crate::scanner::targets::{CleanTarget, DevCache, DiskTotals, RiskTier, ScanResult};

/// Print scan results in human-readable format
pub fn print_scan_results(result: &ScanResult, detailed: bool) {
    println!();
    println!("{}  reclaim Scan Results", "🧹");
    println!("{}", "─".repeat(60).dimmed());
    print_disk_line(&result.totals);
    println!(
        "  Scanned in {}  •  {} cleanable  •  {} safe",
        format::format_duration(result.duration_secs).cyan(),
        format_size_colored(result.cleanable.total),
        format_size(result.cleanable.safe).green()
    );
    println!("{}", "─".repeat(60).dimmed());
    println!();

    if !result.categories.is_empty() && detailed {
        println!("  {}", "Storage".bold());
        for cat in &result.categories {
            println!("    {:<30} {:>12}", cat.name, format_size(cat.size_bytes));
        }
        println!();
    }

    if result.dev_caches.is_empty() {
        println!("  {} No developer caches worth cleaning", "✨");
    } else {
        for (tier, heading) in [
            (RiskTier::Safe, "Safe to Remove".green().bold()),
            (RiskTier::Caution, "Review Recommended".yellow().bold()),
            (RiskTier::Risky, "May Contain Your Data".red().bold()),
        ] {
            let caches = result.caches_where(|t| t == tier);
            if caches.is_empty() {
                continue;
            }
            let total: u64 = caches.iter().map(|c| c.size_bytes).sum();
            println!("  {} {} ({})", "●".color(tier_color(tier)), heading, format_size_colored(total));
            println!();
            for cache in caches {
                print_cache(cache, detailed);
            }
            println!();
        }
    }

    if result.trash_bytes > 0 {
        println!("  {} Trash: {}", "🗑️", format_size_colored(result.trash_bytes));
        println!();
    }

    if detailed {
        print_large_files(result);
        print_artifacts(result);
    } else if !result.artifacts.is_empty() {
        println!(
            "  {} {} in build artifacts ({}, {} stale)",
            "📦",
            format_size_colored(result.cleanable.artifacts),
            format::format_count(result.artifacts.len(), "project"),
            result.stale_artifacts().len()
        );
        println!();
    }

    if !result.inaccessible_paths.is_empty() {
        println!(
            "  {} {} could not be read (Full Disk Access may be needed):",
            "🔒",
            format::format_count(result.inaccessible_paths.len(), "location")
        );
        for name in &result.inaccessible_paths {
            println!("    {} {}", "→".dimmed(), name.dimmed());
        }
        println!();
    }

    if !result.errors.is_empty() {
        println!(
            "  {} {}",
            "⚠".yellow(),
            format!("{} warnings:", result.errors.len()).yellow()
        );
        for error in &result.errors {
            println!("    {} {}", "→".dimmed(), error.dimmed());
        }
        println!();
    }

    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  {} Run {} to move safe caches to the trash",
        "💡",
        "reclaim clean --safe".cyan()
    );
    println!();
}

fn tier_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::Safe => Color::Green,
        RiskTier::Caution => Color::Yellow,
        RiskTier::Risky => Color::Red,
    }
}

fn print_disk_line(totals: &DiskTotals) {
    if totals.total_bytes == 0 {
        return;
    }
    println!(
        "  {} {}%  {} of {} used, {} free",
        format::usage_bar(totals.used_fraction(), 24),
        totals.used_percent,
        format_size(totals.used_bytes),
        format_size(totals.total_bytes),
        format_size(totals.free_bytes).cyan()
    );
}

fn print_cache(cache: &DevCache, detailed: bool) {
    println!(
        "    {} {:<32} {:>12}",
        "🔧",
        format::truncate(&cache.name, 32),
        format_size(cache.size_bytes)
    );

    if detailed {
        println!("      {} {}", "↳".dimmed(), format_path(&cache.path).dimmed());
        println!("      {} {}", "↳".dimmed(), cache.description.dimmed());
        if let Some(detail) = &cache.detail {
            println!("      {} {}", "↳".dimmed(), detail.dimmed());
        }
    }
    if let Some(suggestion) = &cache.suggestion {
        println!("      {} {}", "💡".dimmed(), suggestion.italic());
    }
}

fn print_large_files(result: &ScanResult) {
    if result.large_files.is_empty() {
        return;
    }
    println!("  {} {}", "📄", "Large Files".bold());
    for file in &result.large_files {
        println!(
            "    {:<48} {:>12}",
            format::truncate(&format_path(&file.path), 48),
            format_size(file.size_bytes)
        );
    }
    println!();
}

fn print_artifacts(result: &ScanResult) {
    if result.artifacts.is_empty() {
        return;
    }
    println!(
        "  {} {} ({})",
        "📦",
        "Project Artifacts".bold(),
        format_size_colored(result.cleanable.artifacts)
    );
    for a in &result.artifacts {
        let age = match a.days_since_modified {
            Some(d) if a.is_stale(result.stale_after_days) => format!("{}d, stale", d).yellow(),
            Some(d) => format!("{}d", d).dimmed(),
            None => "".normal(),
        };
        println!(
            "    {:<36} {:<10} {:>12}  {}",
            format::truncate(&format!("{}/{}", a.project_name, a.artifact_name), 36),
            a.project_type_label.dimmed(),
            format_size(a.size_bytes),
            age
        );
        println!("      {} {}", "↳".dimmed(), format_path(&a.artifact_path).dimmed());
    }
    println!();
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing output: {}", e),
    }
}

/// Print a minimal summary: cleanable, safe, used percent
pub fn print_scan_quiet(result: &ScanResult) {
    println!(
        "{}  {}  {}%",
        format_size(result.cleanable.total),
        format_size(result.cleanable.safe),
        result.totals.used_percent
    );
}

/// Print what a cleanup is about to touch
pub fn print_clean_preview(targets: &[CleanTarget]) {
    println!();
    for target in targets {
        let tier = match target {
            CleanTarget::Cache(c) => format::format_risk(c.risk_tier),
            CleanTarget::Artifact(_) => "Artifact".cyan(),
        };
        println!(
            "    {:<36} {:>12}  {}",
            format::truncate(&target.label(), 36),
            format_size(target.size_bytes()),
            tier
        );
    }
}

/// Print a clean operation report
pub fn print_clean_report(report: &CleanReport, verb: &str) {
    println!();
    if report.dry_run {
        println!(
            "  {} {}: would recover {}. Nothing was modified.",
            "ℹ️",
            "Dry run".bold(),
            format_size_colored(report.intended_bytes)
        );
        println!();
        return;
    }

    println!(
        "  {} {} {}, recovered {}",
        "✓".green(),
        verb.bold(),
        format::format_count(report.items_trashed, "item").cyan(),
        format_size_colored(report.recovered_bytes),
    );

    if report.items_failed > 0 {
        println!(
            "  {} {} left in place",
            "⚠".yellow(),
            format::format_count(report.items_failed, "item")
        );
    }

    if !report.errors.is_empty() {
        println!();
        println!("  {} {} errors:", "⚠".yellow(), report.errors.len());
        for (i, err) in report.errors.iter().enumerate().take(10) {
            println!("    {} {}", format!("{}.", i + 1).dimmed(), err.dimmed());
        }
        if report.errors.len() > 10 {
            println!(
                "    ... and {} more",
                (report.errors.len() - 10).to_string().dimmed()
            );
        }
    }
    println!();
}

/// Print the days-until-full forecast
pub fn print_forecast(summary: &ForecastSummary, totals: &DiskTotals) {
    format::print_header("📈 Disk Forecast");
    print_disk_line(totals);
    println!();

    let days = match summary.forecast.days_until_full {
        Some(1) => "about 1 day".red().bold(),
        Some(d) if d <= 30 => format!("about {} days", d).red().bold(),
        Some(d) => format!("about {} days", d).yellow(),
        None => "unknown".dimmed(),
    };
    format::print_kv("Full in", &days.to_string());
    format::print_kv(
        "Growth",
        &format::format_rate(summary.forecast.daily_growth_bytes.round() as i64),
    );
    format::print_kv(
        "History",
        &format!(
            "{} over {} days",
            format::format_count(summary.history_points, "snapshot"),
            summary.history_span_days
        ),
    );
    if summary.forecast.days_until_full.is_none() && summary.history_span_days < 1 {
        println!();
        println!(
            "  {} A forecast needs at least a day of history; run {} again later.",
            "💡",
            "reclaim scan".cyan()
        );
    }
    println!();
}

/// Print lifetime savings and engine state
pub fn print_status(snapshot: &MonitorSnapshot) {
    format::print_header("📊 reclaim Status");
    format::print_kv("Total saved", &format_size_colored(snapshot.total_saved).to_string());
    if snapshot.last_cleaned > 0 {
        format::print_kv("Last cleanup", &format_size(snapshot.last_cleaned));
    }
    format::print_kv(
        "Usage history",
        &format!(
            "{} over {} days",
            format::format_count(snapshot.forecast.history_points, "snapshot"),
            snapshot.forecast.history_span_days
        ),
    );
    format::print_kv(
        "Onboarding",
        if snapshot.is_first_launch {
            "not completed"
        } else {
            "completed"
        },
    );
    println!();
}
