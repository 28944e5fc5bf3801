//! Remove packages the desired state doesn't declare.

use anyhow::{Context, Result};
use brewkit::PackageKind;
use colored::Colorize;
use dialoguer::Confirm;
use provision::cleaner::CLEAN_KINDS;
use provision::{CleanResult, Cleaner};

use crate::cli::CleanArgs;
use crate::commands::{DesiredState, colored_kind, create_client, load_desired};
use crate::config::Settings;
use crate::Context as AppContext;
use crate::{progress, ui};

pub fn run(ctx: &AppContext, args: &CleanArgs) -> Result<()> {
    let settings = Settings::load()?;
    let desired = load_desired(ctx, &args.source, &settings)?;
    let client = create_client()?;
    let cleaner = Cleaner::new(&client);

    ui::header("Clean");
    ui::dim(&format!("Desired state: {}", desired.describe()));

    let pb = progress::spinner("Comparing installed packages...");
    let diff = match &desired {
        DesiredState::Snapshot { snapshot, .. } => cleaner.diff_from_snapshot(snapshot),
        DesiredState::Remote(config) => {
            cleaner.diff_from_lists(&config.packages, &config.casks, &config.npm)
        }
    };
    let mut result = match diff {
        Ok(r) => {
            progress::finish_clear(&pb);
            r
        }
        Err(e) => {
            progress::finish_warn(&pb, "Could not list installed packages");
            return Err(e).context("Failed to compare against desired state");
        }
    };

    if settings.install.skip_npm {
        result.extra_npm.clear();
    }

    if result.is_clean() {
        ui::success("Nothing to remove; machine matches the desired state");
        return Ok(());
    }

    print_extras(&result);

    if args.dry_run {
        println!();
        ui::info(&format!(
            "Dry run: {} would be removed",
            ui::plural(result.total_extra(), "package", "packages")
        ));
        return Ok(());
    }

    if desired.is_empty() {
        // --yes is not enough to wipe every package.
        ui::warn("The desired state lists no packages; every installed package above will be removed");
        if !confirm_everything(result.total_extra())? {
            ui::info("Aborted");
            return Ok(());
        }
    } else if !args.yes && !confirm(result.total_extra())? {
        ui::info("Aborted");
        return Ok(());
    }

    println!();
    let pb = progress::bar(result.total_extra() as u64, "Removing...");
    let outcome = cleaner.execute_with(&mut result, false, |package, outcome| {
        pb.inc(1);
        if outcome.is_err() {
            pb.println(format!("  {} {}", "✗".red(), package));
        }
    });
    progress::finish_clear(&pb);

    print_outcome(ctx, &result);
    outcome.context("Some packages could not be removed")
}

fn confirm(count: usize) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!(
            "Remove {}?",
            ui::plural(count, "package", "packages")
        ))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

fn confirm_everything(count: usize) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!(
            "Really remove all {}?",
            ui::plural(count, "installed package", "installed packages")
        ))
        .default(false)
        .interact()
        .context("Refusing to remove every package without an interactive confirmation")
}

fn print_extras(result: &CleanResult) {
    for kind in CLEAN_KINDS {
        let extras = result.extras(kind);
        if extras.is_empty() {
            continue;
        }
        ui::section(&format!("Extra {} ({})", kind.plural(), extras.len()));
        for name in extras {
            ui::item(&"-".red().to_string(), name);
        }
    }
}

fn print_outcome(ctx: &AppContext, result: &CleanResult) {
    if ctx.verbose > 0 {
        for kind in CLEAN_KINDS {
            for name in result.removed(kind) {
                ui::dim(&format!("removed {} {}", colored_kind(kind), name));
            }
        }
    }

    for kind in CLEAN_KINDS {
        let failed = result.failed(kind);
        if !failed.is_empty() {
            ui::error(&format!(
                "Failed to remove {} {}: {}",
                failed.len(),
                kind.plural(),
                failed.join(", ")
            ));
        }
    }

    if result.total_removed() > 0 {
        ui::success(&format!(
            "Removed {}",
            ui::plural(result.total_removed(), "package", "packages")
        ));
    }
    if !result.removed(PackageKind::Formula).is_empty() {
        ui::dim("Run `brew autoremove` to drop dependencies that are no longer needed");
    }
}
