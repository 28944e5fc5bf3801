pub mod clean;
pub mod install;
pub mod presets;
pub mod snapshot;
pub mod state;

use anyhow::{Result, anyhow};
use brewkit::PackageKind;
use colored::{ColoredString, Colorize};
use provision::Snapshot;
use std::path::{Path, PathBuf};

use crate::cli::SourceArgs;
use crate::config::{RemoteConfig, Settings};
use crate::Context as AppContext;

/// Create a brewkit client, explaining how to get Homebrew if it's missing.
pub fn create_client() -> Result<brewkit::Client> {
    match brewkit::Client::new() {
        Ok(c) => Ok(c),
        Err(brewkit::Error::BrewNotFound) => Err(anyhow!(
            "Homebrew is not installed.\n\n  Install it with:\n    /bin/bash -c \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)\"\n\n  Or visit: https://brew.sh"
        )),
        Err(e) => Err(anyhow!("Failed to initialize Homebrew client: {e}")),
    }
}

/// Format a package kind with color.
pub fn colored_kind(kind: PackageKind) -> ColoredString {
    match kind {
        PackageKind::Tap => kind.label().blue(),
        PackageKind::Formula => kind.label().green(),
        PackageKind::Cask => kind.label().magenta(),
        PackageKind::Npm => kind.label().yellow(),
    }
}

// ============================================================================
// Desired State
// ============================================================================

/// The state a `clean` or `install` run works toward.
pub enum DesiredState {
    Snapshot { snapshot: Box<Snapshot>, origin: PathBuf },
    Remote(RemoteConfig),
}

impl DesiredState {
    pub fn describe(&self) -> String {
        match self {
            Self::Snapshot { origin, .. } => format!("snapshot {}", origin.display()),
            Self::Remote(config) => config.label(),
        }
    }

    /// True when nothing installable is wanted. Cleaning against this
    /// removes every installed package.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Snapshot { snapshot, .. } => snapshot.packages.installable().next().is_none(),
            Self::Remote(config) => config.is_empty(),
        }
    }
}

/// Resolve `--from` / `--config`, falling back to the local snapshot.
pub fn load_desired(ctx: &AppContext, source: &SourceArgs, settings: &Settings) -> Result<DesiredState> {
    if let Some(path) = &source.config {
        return Ok(DesiredState::Remote(RemoteConfig::load(path)?));
    }

    let path = match &source.from {
        Some(p) => p.clone(),
        None => settings.local_snapshot_path()?,
    };
    load_snapshot(ctx, &path).map(|snapshot| DesiredState::Snapshot {
        snapshot: Box::new(snapshot),
        origin: path,
    })
}

/// Load a snapshot, turning a missing file into a hint.
pub fn load_snapshot(ctx: &AppContext, path: &Path) -> Result<Snapshot> {
    match Snapshot::load(path, &ctx.catalog) {
        Ok(s) => Ok(s),
        Err(e) if e.is_not_found() => Err(anyhow!(
            "No snapshot at {}. Run `openboot snapshot` first, or pass --from / --config.",
            path.display()
        )),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provision::PackageSet;

    fn snapshot_state(packages: PackageSet) -> DesiredState {
        let mut snapshot = Snapshot::new("host");
        snapshot.packages = packages;
        DesiredState::Snapshot {
            snapshot: Box::new(snapshot),
            origin: PathBuf::from("snapshot.json"),
        }
    }

    #[test]
    fn test_desired_state_emptiness() {
        assert!(snapshot_state(PackageSet::default()).is_empty());

        let taps_only = PackageSet {
            taps: vec!["oven-sh/bun".to_string()],
            ..PackageSet::default()
        };
        assert!(snapshot_state(taps_only).is_empty());

        let with_cask = PackageSet {
            casks: vec!["iterm2".to_string()],
            ..PackageSet::default()
        };
        assert!(!snapshot_state(with_cask).is_empty());

        let remote = RemoteConfig::parse(r#"{"packages": []}"#).unwrap();
        assert!(DesiredState::Remote(remote).is_empty());
    }
}
