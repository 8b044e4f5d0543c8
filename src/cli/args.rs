use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// reclaim: find and safely reclaim disk space taken by developer caches
#[derive(Parser, Debug)]
#[command(
    name = "reclaim",
    version,
    about = "Find reclaimable disk space and clean it up through the trash",
    long_about = "reclaim sizes developer caches, build artifacts, large files and the trash,\n\
                   classifies caches by risk, forecasts when the disk fills up,\n\
                   and cleans by moving items to the trash.",
    after_help = "EXAMPLES:\n  \
        reclaim scan                        Scan and summarize reclaimable space\n  \
        reclaim scan --detailed             Include paths, suggestions and artifacts\n  \
        reclaim --format json scan          Machine-readable scan result\n  \
        reclaim clean --safe                Trash every non-risky dev cache\n  \
        reclaim clean --all --dry-run       Preview cleaning every dev cache\n  \
        reclaim clean --item ~/.npm/_cacache  Trash the contents of one item\n  \
        reclaim empty-trash                 Permanently empty the trash\n  \
        reclaim forecast                    Days until the disk is full\n  \
        reclaim status                      Lifetime savings and history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format [default: from config, else human]
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode, minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for reclaimable space
    Scan {
        /// Show paths, suggestions, large files and project artifacts
        #[arg(long)]
        detailed: bool,
    },

    /// Move cache or artifact contents to the trash
    #[command(group(
        ArgGroup::new("selection")
            .required(true)
            .args(["safe", "all", "item"])
    ))]
    Clean {
        /// Every dev cache except risky ones
        #[arg(long)]
        safe: bool,

        /// Every dev cache, risky ones included
        #[arg(long)]
        all: bool,

        /// Specific cache or artifact directories from the last scan
        #[arg(long, value_name = "PATH", num_args = 1..)]
        item: Vec<PathBuf>,

        /// Show what would be cleaned without touching anything
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Permanently delete everything in the trash
    EmptyTrash {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Estimate when the disk will be full
    Forecast,

    /// Show lifetime savings, usage history and onboarding state
    Status,

    /// Reveal a path in the system file browser
    Reveal {
        path: PathBuf,
    },

    /// Mark first-run onboarding as done
    Onboard,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset to default configuration
    Reset,

    /// Initialize reclaim directories and default config
    Init,

    /// Print the config file location
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

impl Cli {
    /// `--format`, then `--quiet`, then the configured default
    pub fn output_format(&self, configured: &crate::common::config::OutputFormat) -> OutputFormat {
        use crate::common::config::OutputFormat as Configured;
        if let Some(format) = self.format {
            return format;
        }
        if self.quiet {
            return OutputFormat::Quiet;
        }
        match configured {
            Configured::Human => OutputFormat::Human,
            Configured::Json => OutputFormat::Json,
            Configured::Quiet => OutputFormat::Quiet,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_clean_requires_a_selection() {
        assert!(Cli::try_parse_from(["reclaim", "clean"]).is_err());
        assert!(Cli::try_parse_from(["reclaim", "clean", "--safe", "--all"]).is_err());
        let cli = Cli::try_parse_from(["reclaim", "clean", "--item", "/a", "/b"]).unwrap();
        match cli.command {
            Commands::Clean { item, .. } => assert_eq!(item.len(), 2),
            _ => panic!("expected clean"),
        }
    }
}
