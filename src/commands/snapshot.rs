//! Capture the machine into a snapshot.

use anyhow::{Context, Result};
use colored::Colorize;
use provision::snapshot::{self, LiveProbe, StepReport};
use provision::Snapshot;

use crate::cli::SnapshotArgs;
use crate::commands::create_client;
use crate::config::Settings;
use crate::Context as AppContext;
use crate::{paths, progress, ui};

pub fn run(ctx: &AppContext, args: &SnapshotArgs) -> Result<()> {
    let settings = Settings::load()?;
    let client = create_client()?;
    let probe = LiveProbe::new(&client, paths::home_dir()?);

    let pb = progress::spinner("Capturing system state...");
    let result = snapshot::capture_with_progress(&probe, &ctx.catalog, |report: &StepReport| {
        pb.set_message(format!(
            "[{}/{}] Captured {} ({})",
            report.index,
            report.total,
            report.step.label(),
            report.items
        ));
    });
    let snapshot = match result {
        Ok(s) => {
            progress::finish_success(&pb, "Captured system state");
            s
        }
        Err(e) => {
            progress::finish_warn(&pb, "Capture failed");
            return Err(e).context("Could not capture system state");
        }
    };

    if !args.no_save {
        let path = settings.local_snapshot_path()?;
        snapshot
            .save(&path)
            .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
        log::info!("Saved local snapshot to {}", path.display());
    }

    if let Some(output) = &args.output {
        snapshot
            .save(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    if args.json {
        println!("{}", snapshot.to_json_pretty()?);
        return Ok(());
    }

    if !ctx.quiet {
        print_summary(&snapshot);
    }
    if let Some(output) = &args.output {
        ui::success(&format!("Snapshot written to {}", output.display()));
    }
    Ok(())
}

fn print_summary(snapshot: &Snapshot) {
    ui::header("Snapshot");
    ui::kv("Host", &snapshot.hostname);
    ui::kv(
        "Captured",
        &snapshot.captured_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    );

    ui::section("Packages");
    let packages = &snapshot.packages;
    ui::kv("Formulae", &packages.formulae.len().to_string());
    ui::kv("Casks", &packages.casks.len().to_string());
    ui::kv("Taps", &packages.taps.len().to_string());
    ui::kv("npm", &packages.npm.len().to_string());

    ui::section("Catalog");
    let matched = &snapshot.catalog_match;
    ui::kv(
        "Known",
        &format!(
            "{} of {} ({})",
            matched.matched.len(),
            matched.matched.len() + matched.unmatched.len(),
            ui::format_percent(matched.match_rate)
        ),
    );
    if !matched.unmatched.is_empty() {
        ui::kv("Unknown", &ui::join_truncated(&matched.unmatched, 8));
    }
    if snapshot.matched_preset.is_empty() {
        ui::kv("Closest preset", &"none".dimmed().to_string());
    } else {
        ui::kv("Closest preset", &snapshot.matched_preset.cyan().to_string());
    }

    ui::section("Environment");
    if !snapshot.shell.default_shell.is_empty() {
        let mut shell = snapshot.shell.default_shell.clone();
        if snapshot.shell.oh_my_zsh {
            shell.push_str(" + oh-my-zsh");
        }
        ui::kv("Shell", &shell);
    }
    if !snapshot.git.user_name.is_empty() {
        ui::kv(
            "Git",
            &format!("{} <{}>", snapshot.git.user_name, snapshot.git.user_email),
        );
    }
    if !snapshot.dev_tools.is_empty() {
        let tools: Vec<String> = snapshot
            .dev_tools
            .iter()
            .map(|t| format!("{} {}", t.name, t.version))
            .collect();
        ui::kv("Tools", &tools.join(", "));
    }
    ui::kv("macOS prefs", &snapshot.macos_prefs.len().to_string());
}
