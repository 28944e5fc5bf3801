//! Sequential, phase-by-phase capture of a machine's state.

use super::{DevTool, GitIdentity, MacOsPref, ShellProfile, Snapshot};
use crate::error::{Error, Result};
use crate::matcher;
use catalog::Catalog;

/// A capture phase, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    Formulae,
    Casks,
    Taps,
    Npm,
    MacOsPrefs,
    Shell,
    Git,
    DevTools,
}

impl CaptureStep {
    pub const ALL: [Self; 8] = [
        Self::Formulae,
        Self::Casks,
        Self::Taps,
        Self::Npm,
        Self::MacOsPrefs,
        Self::Shell,
        Self::Git,
        Self::DevTools,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Formulae => "Homebrew formulae",
            Self::Casks => "Homebrew casks",
            Self::Taps => "Homebrew taps",
            Self::Npm => "global npm packages",
            Self::MacOsPrefs => "macOS preferences",
            Self::Shell => "shell configuration",
            Self::Git => "git identity",
            Self::DevTools => "developer tools",
        }
    }

    /// Whether a failure in this phase aborts the capture.
    pub fn is_essential(&self) -> bool {
        matches!(self, Self::Formulae)
    }
}

/// Progress notification sent after a phase completes.
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub step: CaptureStep,
    /// 1-based position of `step`
    pub index: usize,
    pub total: usize,
    /// Number of items the phase produced
    pub items: usize,
}

/// Source of machine facts. Each method is one blocking external query.
pub trait SystemProbe {
    fn hostname(&self) -> String;
    fn formulae(&self) -> Result<Vec<String>>;
    fn casks(&self) -> Result<Vec<String>>;
    fn taps(&self) -> Result<Vec<String>>;
    fn npm_globals(&self) -> Result<Vec<String>>;
    fn macos_prefs(&self) -> Result<Vec<MacOsPref>>;
    fn shell(&self) -> Result<ShellProfile>;
    fn git(&self) -> Result<GitIdentity>;
    fn dev_tools(&self) -> Result<Vec<DevTool>>;
}

/// Capture a snapshot without progress reporting.
pub fn capture(probe: &dyn SystemProbe, catalog: &Catalog) -> Result<Snapshot> {
    capture_with_progress(probe, catalog, |_| {})
}

/// Capture a snapshot, calling `on_step` after each phase and before the
/// next one starts.
///
/// Only [`CaptureStep::Formulae`] is essential. Any other phase that fails
/// is logged and contributes an empty value.
pub fn capture_with_progress<F>(probe: &dyn SystemProbe, catalog: &Catalog, mut on_step: F) -> Result<Snapshot>
where
    F: FnMut(&StepReport),
{
    let mut snapshot = Snapshot::new(probe.hostname());
    let total = CaptureStep::ALL.len();

    for (i, step) in CaptureStep::ALL.into_iter().enumerate() {
        log::debug!("Capturing {}", step.label());
        let items = run_step(probe, step, &mut snapshot)?;
        on_step(&StepReport {
            step,
            index: i + 1,
            total,
            items,
        });
    }

    snapshot.catalog_match = matcher::match_packages(catalog, &snapshot.packages);
    snapshot.matched_preset = matcher::detect_best_preset(catalog, &snapshot.packages)
        .unwrap_or_default()
        .to_string();

    log::info!(
        "Captured {} formulae, {} casks, {} npm packages ({:.0}% in catalog)",
        snapshot.packages.formulae.len(),
        snapshot.packages.casks.len(),
        snapshot.packages.npm.len(),
        snapshot.catalog_match.match_rate * 100.0
    );
    Ok(snapshot)
}

/// Run one phase, storing its result. Returns the number of items captured.
fn run_step(probe: &dyn SystemProbe, step: CaptureStep, snapshot: &mut Snapshot) -> Result<usize> {
    let packages = &mut snapshot.packages;
    let items = match step {
        CaptureStep::Formulae => {
            packages.formulae = probe.formulae().map_err(|source| Error::Capture {
                step: step.label(),
                source: Box::new(source),
            })?;
            packages.formulae.len()
        }
        CaptureStep::Casks => {
            packages.casks = degrade(step, probe.casks());
            packages.casks.len()
        }
        CaptureStep::Taps => {
            packages.taps = degrade(step, probe.taps());
            packages.taps.len()
        }
        CaptureStep::Npm => {
            packages.npm = degrade(step, probe.npm_globals());
            packages.npm.len()
        }
        CaptureStep::MacOsPrefs => {
            snapshot.macos_prefs = degrade(step, probe.macos_prefs());
            snapshot.macos_prefs.len()
        }
        CaptureStep::Shell => {
            snapshot.shell = degrade(step, probe.shell());
            usize::from(!snapshot.shell.default_shell.is_empty())
        }
        CaptureStep::Git => {
            snapshot.git = degrade(step, probe.git());
            usize::from(!snapshot.git.user_name.is_empty() || !snapshot.git.user_email.is_empty())
        }
        CaptureStep::DevTools => {
            snapshot.dev_tools = degrade(step, probe.dev_tools());
            snapshot.dev_tools.len()
        }
    };
    Ok(items)
}

fn degrade<T: Default>(step: CaptureStep, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        log::warn!("Skipping {}: {e}", step.label());
        T::default()
    })
}
