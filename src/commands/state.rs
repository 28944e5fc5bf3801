use anyhow::{Context, Result};
use brewkit::PackageKind;
use provision::InstallState;

use crate::cli::StateArgs;
use crate::commands::colored_kind;
use crate::Context as AppContext;
use crate::{paths, ui};

const TRACKED_KINDS: [PackageKind; 3] = [PackageKind::Formula, PackageKind::Cask, PackageKind::Npm];

pub fn run(ctx: &AppContext, args: &StateArgs) -> Result<()> {
    let path = paths::install_state_file()?;

    if args.reset {
        let (mut state, load_err) = InstallState::load_lenient(&path);
        if let Some(e) = load_err {
            log::warn!("Discarding unreadable install state: {e}");
        }
        state
            .reset()
            .with_context(|| format!("Failed to reset {}", path.display()))?;
        ui::success("Install record cleared");
        return Ok(());
    }

    let state = InstallState::load(&path)
        .context("Failed to read install state (reset it with `openboot state --reset`)")?;

    ui::header("Install State");
    ui::kv("File", &path.display().to_string());
    if state.is_empty() {
        ui::dim("Nothing recorded yet");
        return Ok(());
    }
    ui::kv(
        "Updated",
        &state.last_updated.format("%Y-%m-%d %H:%M UTC").to_string(),
    );

    for kind in TRACKED_KINDS {
        ui::kv(kind.plural(), &state.count(kind).to_string());
        if ctx.verbose > 0 {
            for name in state.names(kind) {
                ui::item(&colored_kind(kind).to_string(), name);
            }
        }
    }
    Ok(())
}
