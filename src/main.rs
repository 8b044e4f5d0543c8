use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reclaim::cleaner::CleanReport;
use reclaim::cli::args::{Cli, Commands, CompletionShell, ConfigAction, OutputFormat};
use reclaim::cli::{self, output};
use reclaim::common::config::Config;
use reclaim::common::errors::ReclaimError;
use reclaim::common::{format, logging};
use reclaim::monitor::Monitor;
use reclaim::scanner::targets::{ItemId, ScanResult};
use reclaim::scanner::walker;
use reclaim::store::FileStore;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let _log_guard = logging::init(cli.verbose);
    let config = Config::load()?;
    let fmt = cli.output_format(&config.output_format);

    match cli.command {
        Commands::Scan { detailed } => cmd_scan(&build_monitor(config)?, fmt, detailed),

        Commands::Clean {
            safe: _,
            all,
            ref item,
            dry_run,
            yes,
        } => cmd_clean(&build_monitor(config)?, fmt, all, item, dry_run, yes),

        Commands::EmptyTrash { yes } => cmd_empty_trash(&build_monitor(config)?, fmt, yes),

        Commands::Forecast => cmd_forecast(&build_monitor(config)?, fmt),

        Commands::Status => cmd_status(&build_monitor(config)?, fmt),

        Commands::Reveal { ref path } => {
            if build_monitor(config)?.reveal_in_file_browser(path) {
                Ok(())
            } else {
                anyhow::bail!("Could not reveal '{}'", path.display())
            }
        }

        Commands::Onboard => {
            build_monitor(config)?.mark_onboarding_complete();
            if fmt == OutputFormat::Human {
                println!("  {} Onboarding complete", "✓".green());
            }
            Ok(())
        }

        Commands::Config { action } => cmd_config(action, &config),

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                CompletionShell::Bash => clap_complete::Shell::Bash,
                CompletionShell::Zsh => clap_complete::Shell::Zsh,
                CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "reclaim", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn build_monitor(config: Config) -> Result<Monitor> {
    let home = dirs::home_dir().ok_or(ReclaimError::HomeNotFound)?;
    Ok(Monitor::builder(home)
        .store(Arc::new(FileStore::open(Config::state_path())))
        .config(config)
        .build())
}

/// Scan on this thread with a spinner for human output
fn scan_now(monitor: &Monitor, fmt: OutputFormat) -> Result<Arc<ScanResult>> {
    let pb = (fmt == OutputFormat::Human).then(|| cli::spinner("Scanning caches, artifacts and large files..."));
    let result = monitor.scan_blocking();
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    result.ok_or_else(|| anyhow!("A scan is already in progress"))
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

fn cmd_scan(monitor: &Monitor, fmt: OutputFormat, detailed: bool) -> Result<()> {
    let result = scan_now(monitor, fmt)?;

    match fmt {
        OutputFormat::Human => output::print_scan_results(&result, detailed),
        OutputFormat::Json => output::print_json(&*result),
        OutputFormat::Quiet => output::print_scan_quiet(&result),
    }
    Ok(())
}

// ─── Clean ────────────────────────────────────────────────────────────────────

fn cmd_clean(
    monitor: &Monitor,
    fmt: OutputFormat,
    all: bool,
    items: &[PathBuf],
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    scan_now(monitor, fmt)?;

    let selection = if items.is_empty() {
        None
    } else {
        Some(item_ids(items)?)
    };
    let targets = match &selection {
        Some(ids) => monitor.selection_targets(ids),
        None => monitor.targets_by_risk(!all),
    };

    if targets.is_empty() {
        if selection.is_some() {
            anyhow::bail!("None of the given paths is a cache or artifact found by the scan");
        }
        if fmt == OutputFormat::Human {
            println!("  {} Nothing to clean!", "✨");
        }
        return Ok(());
    }

    if fmt == OutputFormat::Human {
        output::print_clean_preview(&targets);
    }

    if dry_run {
        let report = CleanReport::dry_run(&targets);
        return print_report(&report, fmt, "Trashed");
    }

    if !yes {
        let total: u64 = targets.iter().map(|t| t.size_bytes()).sum();
        let prompt = format!(
            "Move the contents of {} ({}) to the trash?",
            format::format_count(targets.len(), "item"),
            format::format_size(total)
        );
        if !cli::confirm(&prompt)? {
            return Ok(());
        }
    }

    let handle = match &selection {
        Some(ids) => monitor.clean_selection(ids),
        None => monitor.clean_by_risk_filter(!all),
    };
    let report = handle.join().map_err(|_| anyhow!("Cleanup worker panicked"))?;
    print_report(&report, fmt, "Trashed")
}

/// Ids for user-supplied paths; each path may name a cache or an artifact
fn item_ids(items: &[PathBuf]) -> Result<HashSet<ItemId>> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let mut ids = HashSet::new();
    for item in items {
        let path = absolute(&cwd, item);
        ids.insert(ItemId::cache(&path));
        ids.insert(ItemId::artifact(&path));
    }
    Ok(ids)
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let trimmed = joined.to_string_lossy().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        joined
    } else {
        PathBuf::from(trimmed)
    }
}

fn print_report(report: &CleanReport, fmt: OutputFormat, verb: &str) -> Result<()> {
    match fmt {
        OutputFormat::Human => output::print_clean_report(report, verb),
        OutputFormat::Json => output::print_json(report),
        OutputFormat::Quiet => println!("{}", format::format_size(report.recovered_bytes)),
    }
    Ok(())
}

// ─── Empty trash ──────────────────────────────────────────────────────────────

fn cmd_empty_trash(monitor: &Monitor, fmt: OutputFormat, yes: bool) -> Result<()> {
    let size = walker::dir_size(monitor.trash_location());
    let is_empty = std::fs::read_dir(monitor.trash_location())
        .map(|mut rd| rd.next().is_none())
        .unwrap_or(true);

    if is_empty {
        if fmt == OutputFormat::Human {
            println!("  {} The trash is already empty", "✨");
        }
        return Ok(());
    }

    if !yes {
        let prompt = format!(
            "PERMANENTLY delete {} in the trash? This cannot be undone.",
            format::format_size(size)
        );
        if !cli::confirm(&prompt)? {
            return Ok(());
        }
    }

    let report = monitor
        .empty_trash()
        .join()
        .map_err(|_| anyhow!("Cleanup worker panicked"))?;
    print_report(&report, fmt, "Permanently deleted")
}

// ─── Forecast & Status ────────────────────────────────────────────────────────

fn cmd_forecast(monitor: &Monitor, fmt: OutputFormat) -> Result<()> {
    let result = scan_now(monitor, fmt)?;
    let summary = monitor.snapshot().forecast;

    match fmt {
        OutputFormat::Human => output::print_forecast(&summary, &result.totals),
        OutputFormat::Json => output::print_json(&summary),
        OutputFormat::Quiet => match summary.forecast.days_until_full {
            Some(days) => println!("{}", days),
            None => println!("unknown"),
        },
    }
    Ok(())
}

fn cmd_status(monitor: &Monitor, fmt: OutputFormat) -> Result<()> {
    let snapshot = monitor.snapshot();
    match fmt {
        OutputFormat::Human => output::print_status(&snapshot),
        OutputFormat::Json => output::print_json(&snapshot),
        OutputFormat::Quiet => println!("{}", format::format_size(snapshot.total_saved)),
    }
    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{}", toml);
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("  {} Configuration reset to defaults", "✓".green());
        }
        ConfigAction::Init => {
            Config::init_dirs()?;
            if !Config::config_path().exists() {
                Config::default().save()?;
            }
            println!(
                "  {} Initialized {}",
                "✓".green(),
                format::format_path(&Config::data_dir()).cyan()
            );
        }
        ConfigAction::Path => println!("{}", Config::config_path().display()),
    }
    Ok(())
}
