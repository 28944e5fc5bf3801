//! Resumable package installation.
//!
//! Packages already recorded in the [`InstallState`], or already present on
//! the machine, are skipped. Each successful install is recorded before the
//! next one starts. A failed package never stops the batch.

use crate::error::{Error, Result};
use crate::install_state::InstallState;
use crate::snapshot::Snapshot;
use brewkit::{Client, Package, PackageKind, RetryConfig};
use catalog::Preset;
use std::collections::{HashMap, HashSet};

/// Packages to install, by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub taps: Vec<String>,
    pub formulae: Vec<String>,
    pub casks: Vec<String>,
    pub npm: Vec<String>,
}

impl InstallPlan {
    pub fn from_preset(preset: &Preset) -> Self {
        Self {
            taps: Vec::new(),
            formulae: preset.cli.clone(),
            casks: preset.cask.clone(),
            npm: preset.npm.clone(),
        }
    }

    /// Everything the snapshot recorded, taps included.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let packages = &snapshot.packages;
        Self {
            taps: packages.taps.clone(),
            formulae: packages.formulae.clone(),
            casks: packages.casks.clone(),
            npm: packages.npm.clone(),
        }
    }

    pub fn from_lists(taps: &[String], formulae: &[String], casks: &[String], npm: &[String]) -> Self {
        Self {
            taps: taps.to_vec(),
            formulae: formulae.to_vec(),
            casks: casks.to_vec(),
            npm: npm.to_vec(),
        }
    }

    pub fn without_npm(mut self) -> Self {
        self.npm.clear();
        self
    }

    /// Packages in install order: taps, formulae, casks, npm. Duplicates
    /// within a kind are dropped.
    pub fn packages(&self) -> Vec<Package> {
        let lists = [
            (PackageKind::Tap, &self.taps),
            (PackageKind::Formula, &self.formulae),
            (PackageKind::Cask, &self.casks),
            (PackageKind::Npm, &self.npm),
        ];

        let mut packages = Vec::new();
        for (kind, names) in lists {
            let mut seen = HashSet::new();
            for name in names {
                if seen.insert(name.as_str()) {
                    packages.push(Package::new(name.clone(), kind));
                }
            }
        }
        packages
    }

    pub fn len(&self) -> usize {
        self.packages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty() && self.formulae.is_empty() && self.casks.is_empty() && self.npm.is_empty()
    }
}

/// What happened to one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// Already recorded or already present
    Skipped,
    Failed(String),
    /// Would be installed (dry run)
    Pending,
}

/// Summary of an install run.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub installed: Vec<Package>,
    pub skipped: Vec<Package>,
    pub failed: Vec<(Package, String)>,
    pub pending: Vec<Package>,
}

impl InstallReport {
    pub fn attempted(&self) -> usize {
        self.installed.len() + self.failed.len()
    }

    /// [`Error::PartialInstall`] if any package failed.
    pub fn ensure_success(&self) -> Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }
        Err(Error::PartialInstall {
            failed: self.failed.len(),
            attempted: self.attempted(),
        })
    }
}

pub struct Installer<'a> {
    client: &'a Client,
    state: &'a mut InstallState,
    retry: RetryConfig,
}

impl<'a> Installer<'a> {
    pub fn new(client: &'a Client, state: &'a mut InstallState) -> Self {
        Self {
            client,
            state,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Install a plan. See [`Installer::run_with`].
    pub fn run(&mut self, plan: &InstallPlan, dry_run: bool) -> InstallReport {
        self.run_with(plan, dry_run, |_, _| {})
    }

    /// Install every package in `plan` that is neither recorded nor present,
    /// calling `on_done` once per package.
    ///
    /// On a dry run nothing is installed or recorded; packages that would be
    /// installed are reported as [`InstallOutcome::Pending`].
    pub fn run_with<F>(&mut self, plan: &InstallPlan, dry_run: bool, mut on_done: F) -> InstallReport
    where
        F: FnMut(&Package, &InstallOutcome),
    {
        let present = self.present_packages();
        let mut report = InstallReport::default();

        for package in plan.packages() {
            let outcome = self.install_one(&package, &present, dry_run);
            on_done(&package, &outcome);
            match outcome {
                InstallOutcome::Installed => report.installed.push(package),
                InstallOutcome::Skipped => report.skipped.push(package),
                InstallOutcome::Pending => report.pending.push(package),
                InstallOutcome::Failed(reason) => report.failed.push((package, reason)),
            }
        }

        log::info!(
            "Install finished: {} installed, {} skipped, {} failed",
            report.installed.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    fn install_one(
        &mut self,
        package: &Package,
        present: &HashMap<PackageKind, HashSet<String>>,
        dry_run: bool,
    ) -> InstallOutcome {
        if self.state.is_installed(package.kind, &package.name) {
            log::debug!("{package} already recorded, skipping");
            return InstallOutcome::Skipped;
        }

        let is_present = present.get(&package.kind).is_some_and(|names| names.contains(&package.name));
        if is_present {
            log::debug!("{package} already present, skipping");
            if !dry_run {
                self.record(package);
            }
            return InstallOutcome::Skipped;
        }

        if dry_run {
            return InstallOutcome::Pending;
        }

        match self.client.install_with_retry(package, &self.retry) {
            Ok(()) => {
                self.record(package);
                InstallOutcome::Installed
            }
            Err(e) if e.is_ignorable() => {
                log::debug!("{package}: {e}");
                self.record(package);
                InstallOutcome::Skipped
            }
            Err(e) => {
                log::warn!("Failed to install {package}: {e}. {}", e.category().advice());
                InstallOutcome::Failed(e.to_string())
            }
        }
    }

    fn record(&mut self, package: &Package) {
        if let Err(e) = self.state.mark(package.kind, &package.name) {
            log::warn!("Could not record {package} as installed: {e}");
        }
    }

    /// Installed names per kind. A kind that cannot be listed is treated
    /// as having nothing installed.
    fn present_packages(&self) -> HashMap<PackageKind, HashSet<String>> {
        PackageKind::ALL
            .into_iter()
            .filter_map(|kind| match self.client.list_installed(kind) {
                Ok(names) => Some((kind, names.into_iter().collect())),
                Err(e) => {
                    log::debug!("Could not list installed {}: {e}", kind.plural());
                    None
                }
            })
            .collect()
    }
}
