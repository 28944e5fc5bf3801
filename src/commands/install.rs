//! Install a preset, snapshot or config, resuming where a previous run
//! stopped.

use anyhow::{Context, Result, bail};
use colored::Colorize;
use provision::{InstallOutcome, InstallPlan, InstallReport, InstallState, Installer};

use crate::cli::InstallArgs;
use crate::commands::{DesiredState, colored_kind, create_client, load_desired};
use crate::config::Settings;
use crate::Context as AppContext;
use crate::{paths, progress, ui};

pub fn run(ctx: &AppContext, args: &InstallArgs) -> Result<()> {
    let settings = Settings::load()?;
    let (plan, label) = build_plan(ctx, args, &settings)?;
    let plan = if settings.install.skip_npm {
        plan.without_npm()
    } else {
        plan
    };

    ui::header("Install");
    ui::dim(&format!("Source: {label}"));

    if plan.is_empty() {
        ui::info("Nothing to install");
        return Ok(());
    }

    let state_path = paths::install_state_file()?;
    let (mut state, load_err) = InstallState::load_lenient(&state_path);
    if let Some(e) = load_err {
        ui::warn(&format!("{e}; starting with an empty install record"));
    }

    let client = create_client()?;
    let mut installer = Installer::new(&client, &mut state).with_retry(settings.install.retry_config());

    let pb = progress::bar(plan.len() as u64, "Installing...");
    let report = installer.run_with(&plan, args.dry_run, |package, outcome| {
        pb.inc(1);
        pb.set_message(package.name.clone());
        if let InstallOutcome::Failed(reason) = outcome {
            pb.println(format!("  {} {}: {}", "✗".red(), package, reason));
        }
    });
    progress::finish_clear(&pb);

    print_report(ctx, &report, args.dry_run);
    report
        .ensure_success()
        .context("Some packages could not be installed; re-run to retry them")
}

fn build_plan(ctx: &AppContext, args: &InstallArgs, settings: &Settings) -> Result<(InstallPlan, String)> {
    if let Some(name) = &args.preset {
        if catalog::is_scratch(name) {
            return Ok((InstallPlan::default(), "scratch (no preset)".to_string()));
        }
        let Some(preset) = ctx.catalog.preset(name) else {
            let known: Vec<&str> = ctx.catalog.presets().iter().map(|p| p.name.as_str()).collect();
            bail!(
                "Unknown preset '{}'. Available: {}, {}",
                name,
                known.join(", "),
                catalog::SCRATCH_PRESET
            );
        };
        return Ok((InstallPlan::from_preset(preset), format!("preset {}", preset.display_name)));
    }

    let desired = load_desired(ctx, &args.source, settings)?;
    let label = desired.describe();
    let plan = match desired {
        DesiredState::Snapshot { snapshot, .. } => InstallPlan::from_snapshot(&snapshot),
        DesiredState::Remote(config) => {
            InstallPlan::from_lists(&config.taps, &config.packages, &config.casks, &config.npm)
        }
    };
    Ok((plan, label))
}

fn print_report(ctx: &AppContext, report: &InstallReport, dry_run: bool) {
    if dry_run {
        ui::section(&format!("Would install ({})", report.pending.len()));
        for package in &report.pending {
            ui::item(&colored_kind(package.kind).to_string(), &package.name);
        }
        ui::dim(&format!(
            "{} already installed",
            ui::plural(report.skipped.len(), "package", "packages")
        ));
        return;
    }

    if ctx.verbose > 0 {
        for package in &report.skipped {
            ui::dim(&format!("skipped {} {}", colored_kind(package.kind), package.name));
        }
    }

    if !report.installed.is_empty() {
        ui::success(&format!(
            "Installed {}",
            ui::plural(report.installed.len(), "package", "packages")
        ));
    }
    if !report.skipped.is_empty() {
        ui::info(&format!(
            "Skipped {} already installed",
            ui::plural(report.skipped.len(), "package", "packages")
        ));
    }
    if !report.failed.is_empty() {
        ui::error(&format!(
            "Failed to install {}",
            ui::plural(report.failed.len(), "package", "packages")
        ));
        for (package, reason) in &report.failed {
            ui::item(&"✗".red().to_string(), &format!("{package}: {reason}"));
        }
    }
}
