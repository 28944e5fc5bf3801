use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "openboot")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Capture, match and reconcile your workstation's software", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture installed packages and settings into a snapshot
    Snapshot(SnapshotArgs),

    /// Remove packages that the desired state does not declare
    Clean(CleanArgs),

    /// Install a preset, snapshot or config, skipping what is already there
    Install(InstallArgs),

    /// List presets and catalog categories
    Presets,

    /// Show or reset the install ledger
    State(StateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

#[derive(Args)]
pub struct SnapshotArgs {
    /// Also write the snapshot to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the snapshot as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Don't update the local snapshot file
    #[arg(long)]
    pub no_save: bool,
}

/// Where the desired state comes from. Defaults to the local snapshot.
#[derive(Args, Default)]
#[group(multiple = false)]
pub struct SourceArgs {
    /// Snapshot file describing the desired state
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,

    /// Downloaded config (JSON) describing the desired state
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show what would be removed without removing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Don't ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Catalog preset to install (see `openboot presets`)
    #[arg(short, long, conflicts_with_all = ["from", "config"])]
    pub preset: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Show what would be installed without installing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct StateArgs {
    /// Forget every recorded package
    #[arg(long)]
    pub reset: bool,
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
    fn test_clean_sources_conflict() {
        let result = Cli::try_parse_from(["openboot", "clean", "--from", "a.json", "--config", "b.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_install_preset_conflicts_with_file() {
        let result = Cli::try_parse_from(["openboot", "install", "--preset", "minimal", "--from", "a.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_clean_flags() {
        let cli = Cli::try_parse_from(["openboot", "-vv", "clean", "--dry-run", "--yes"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Clean(args) => {
                assert!(args.dry_run);
                assert!(args.yes);
                assert!(args.source.from.is_none());
            }
            _ => panic!("expected clean"),
        }
    }
}
