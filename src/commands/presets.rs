use anyhow::Result;
use colored::Colorize;

use crate::Context as AppContext;
use crate::ui;

pub fn run(ctx: &AppContext) -> Result<()> {
    let catalog = &ctx.catalog;

    ui::header("Presets");
    for preset in catalog.presets() {
        println!(
            "  {} {} {}",
            preset.name.cyan().bold(),
            format!("({})", preset.display_name).dimmed(),
            preset.description
        );
        ui::dim(&format!(
            "{} formulae, {} casks, {} npm",
            preset.cli.len(),
            preset.cask.len(),
            preset.npm.len()
        ));
    }
    println!(
        "  {} {}",
        catalog::SCRATCH_PRESET.cyan().bold(),
        "start from nothing and pick packages yourself".dimmed()
    );

    if ctx.quiet {
        return Ok(());
    }

    ui::header("Catalog");
    for category in catalog.categories() {
        ui::section(&format!("{} ({})", category.name, category.packages.len()));
        if !category.description.is_empty() {
            ui::dim(&category.description);
        }
        for package in &category.packages {
            let kind = format!("[{}]", package.kind).dimmed();
            if package.description.is_empty() {
                ui::item(&kind.to_string(), &package.name);
            } else {
                ui::item(
                    &kind.to_string(),
                    &format!("{} {}", package.name, package.description.dimmed()),
                );
            }
        }
    }
    Ok(())
}
