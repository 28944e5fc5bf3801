//! Reconciliation: find installed packages that the desired state does not
//! declare, and remove them.

use crate::error::{Error, Result};
use crate::snapshot::{PackageSet, Snapshot};
use brewkit::{Client, Package, PackageKind};
use std::collections::HashSet;

/// Kinds that are reconciled, in removal order. Taps are never removed.
pub const CLEAN_KINDS: [PackageKind; 3] = [PackageKind::Formula, PackageKind::Cask, PackageKind::Npm];

/// The outcome of comparing current against desired packages, updated in
/// place as removals complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanResult {
    pub extra_formulae: Vec<String>,
    pub extra_casks: Vec<String>,
    pub extra_npm: Vec<String>,
    pub removed_formulae: Vec<String>,
    pub removed_casks: Vec<String>,
    pub removed_npm: Vec<String>,
    pub failed_formulae: Vec<String>,
    pub failed_casks: Vec<String>,
    pub failed_npm: Vec<String>,
}

impl CleanResult {
    /// Compute `current - desired` for each kind.
    ///
    /// Extras keep the order they appear in `current`, without duplicates.
    pub fn between(current: &PackageSet, formulae: &[String], casks: &[String], npm: &[String]) -> Self {
        Self {
            extra_formulae: difference(&current.formulae, formulae),
            extra_casks: difference(&current.casks, casks),
            extra_npm: difference(&current.npm, npm),
            ..Self::default()
        }
    }

    pub fn extras(&self, kind: PackageKind) -> &[String] {
        match kind {
            PackageKind::Formula => &self.extra_formulae,
            PackageKind::Cask => &self.extra_casks,
            PackageKind::Npm => &self.extra_npm,
            PackageKind::Tap => &[],
        }
    }

    pub fn removed(&self, kind: PackageKind) -> &[String] {
        match kind {
            PackageKind::Formula => &self.removed_formulae,
            PackageKind::Cask => &self.removed_casks,
            PackageKind::Npm => &self.removed_npm,
            PackageKind::Tap => &[],
        }
    }

    pub fn failed(&self, kind: PackageKind) -> &[String] {
        match kind {
            PackageKind::Formula => &self.failed_formulae,
            PackageKind::Cask => &self.failed_casks,
            PackageKind::Npm => &self.failed_npm,
            PackageKind::Tap => &[],
        }
    }

    fn take_extras(&mut self, kind: PackageKind) -> Vec<String> {
        match kind {
            PackageKind::Formula => std::mem::take(&mut self.extra_formulae),
            PackageKind::Cask => std::mem::take(&mut self.extra_casks),
            PackageKind::Npm => std::mem::take(&mut self.extra_npm),
            PackageKind::Tap => Vec::new(),
        }
    }

    fn record(&mut self, package: &Package, ok: bool) {
        let list = match (package.kind, ok) {
            (PackageKind::Formula, true) => &mut self.removed_formulae,
            (PackageKind::Cask, true) => &mut self.removed_casks,
            (PackageKind::Npm, true) => &mut self.removed_npm,
            (PackageKind::Formula, false) => &mut self.failed_formulae,
            (PackageKind::Cask, false) => &mut self.failed_casks,
            (PackageKind::Npm, false) => &mut self.failed_npm,
            (PackageKind::Tap, _) => return,
        };
        list.push(package.name.clone());
    }

    pub fn total_extra(&self) -> usize {
        self.extra_formulae.len() + self.extra_casks.len() + self.extra_npm.len()
    }

    pub fn total_removed(&self) -> usize {
        self.removed_formulae.len() + self.removed_casks.len() + self.removed_npm.len()
    }

    pub fn total_failed(&self) -> usize {
        self.failed_formulae.len() + self.failed_casks.len() + self.failed_npm.len()
    }

    /// Nothing is installed beyond the desired state.
    pub fn is_clean(&self) -> bool {
        self.total_extra() == 0
    }
}

fn difference(current: &[String], desired: &[String]) -> Vec<String> {
    let desired: HashSet<&str> = desired.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    current
        .iter()
        .filter(|name| !desired.contains(name.as_str()) && seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Compares the live machine against a desired state and removes the
/// difference through a package [`Client`].
pub struct Cleaner<'a> {
    client: &'a Client,
}

impl<'a> Cleaner<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Installed formulae, casks and npm packages.
    ///
    /// Listing formulae must succeed. Casks and npm fall back to empty, in
    /// which case nothing of that kind is considered extra.
    pub fn current_packages(&self) -> Result<PackageSet> {
        let formulae = self.client.list_formulae()?;
        let casks = self.client.list_casks().unwrap_or_else(|e| {
            log::warn!("Could not list casks: {e}");
            Vec::new()
        });
        let npm = self.client.list_npm().unwrap_or_else(|e| {
            log::warn!("Could not list npm packages: {e}");
            Vec::new()
        });

        Ok(PackageSet {
            formulae,
            casks,
            taps: Vec::new(),
            npm,
        })
    }

    /// Compare the live machine against a snapshot's packages.
    pub fn diff_from_snapshot(&self, desired: &Snapshot) -> Result<CleanResult> {
        let packages = &desired.packages;
        self.diff_from_lists(&packages.formulae, &packages.casks, &packages.npm)
    }

    /// Compare the live machine against explicit lists.
    pub fn diff_from_lists(&self, formulae: &[String], casks: &[String], npm: &[String]) -> Result<CleanResult> {
        let current = self.current_packages()?;
        let result = CleanResult::between(&current, formulae, casks, npm);
        log::info!(
            "{} extra formulae, {} extra casks, {} extra npm packages",
            result.extra_formulae.len(),
            result.extra_casks.len(),
            result.extra_npm.len()
        );
        Ok(result)
    }

    /// Remove every extra package. See [`Cleaner::execute_with`].
    pub fn execute(&self, result: &mut CleanResult, dry_run: bool) -> Result<()> {
        self.execute_with(result, dry_run, |_, _| {})
    }

    /// Remove every extra package, one at a time, calling `on_done` after
    /// each attempt.
    ///
    /// A dry run touches nothing and leaves `result` unchanged. Otherwise
    /// each name moves out of its extra list into the matching removed or
    /// failed list, so executing the same result again attempts nothing. A
    /// failure never stops the remaining removals. Returns
    /// [`Error::PartialRemoval`] if and only if a removal in this call failed.
    pub fn execute_with<F>(&self, result: &mut CleanResult, dry_run: bool, mut on_done: F) -> Result<()>
    where
        F: FnMut(&Package, &brewkit::Result<()>),
    {
        if dry_run {
            log::debug!("Dry run: {} packages would be removed", result.total_extra());
            return Ok(());
        }

        let mut attempted = 0;
        let mut failed = 0;
        for kind in CLEAN_KINDS {
            let mut seen = HashSet::new();
            for name in result.take_extras(kind) {
                if !seen.insert(name.clone()) {
                    continue;
                }
                let package = Package::new(name, kind);
                attempted += 1;
                let outcome = self.client.uninstall(&package);
                match &outcome {
                    Ok(()) => log::info!("Removed {package}"),
                    Err(e) => {
                        failed += 1;
                        log::warn!("Failed to remove {package}: {e}");
                    }
                }
                result.record(&package, outcome.is_ok());
                on_done(&package, &outcome);
            }
        }

        if failed > 0 {
            return Err(Error::PartialRemoval { failed, attempted });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeBackend;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn machine() -> FakeBackend {
        let backend = FakeBackend::with_installed(PackageKind::Formula, &["git", "wget", "jq", "htop"]);
        backend.add_installed(PackageKind::Cask, &["iterm2", "slack"]);
        backend.add_installed(PackageKind::Npm, &["typescript", "left-pad"]);
        backend
    }

    #[test]
    fn test_between_is_stable_difference() {
        let current = PackageSet {
            formulae: strings(&["wget", "git", "jq", "wget"]),
            casks: strings(&["slack"]),
            taps: strings(&["some/tap"]),
            npm: Vec::new(),
        };
        let result = CleanResult::between(&current, &strings(&["git"]), &strings(&["slack"]), &[]);

        assert_eq!(result.extra_formulae, strings(&["wget", "jq"]));
        assert!(result.extra_casks.is_empty());
        assert!(result.extra_npm.is_empty());
        assert_eq!(result.total_extra(), 2);
    }

    #[test]
    fn test_diff_from_lists() {
        let backend = machine();
        let client = backend.client();
        let result = Cleaner::new(&client)
            .diff_from_lists(&strings(&["git", "jq"]), &strings(&["iterm2"]), &strings(&["typescript"]))
            .unwrap();

        assert_eq!(result.extra_formulae, strings(&["wget", "htop"]));
        assert_eq!(result.extra_casks, strings(&["slack"]));
        assert_eq!(result.extra_npm, strings(&["left-pad"]));
        assert!(result.removed_formulae.is_empty());
    }

    #[test]
    fn test_diff_against_own_state_is_clean() {
        let backend = machine();
        let client = backend.client();
        let cleaner = Cleaner::new(&client);
        let current = cleaner.current_packages().unwrap();
        let mut snapshot = Snapshot::new("host");
        snapshot.packages = current;

        let result = cleaner.diff_from_snapshot(&snapshot).unwrap();
        assert!(result.is_clean());
    }

    #[test]
    fn test_diff_with_empty_desired_marks_everything_extra() {
        let backend = machine();
        let client = backend.client();
        let result = Cleaner::new(&client).diff_from_lists(&[], &[], &[]).unwrap();
        assert_eq!(result.total_extra(), 8);
    }

    #[test]
    fn test_unlistable_npm_is_not_extra() {
        let backend = machine();
        backend.break_listing(PackageKind::Npm);
        let client = backend.client();
        let result = Cleaner::new(&client).diff_from_lists(&[], &[], &[]).unwrap();
        assert!(result.extra_npm.is_empty());
        assert_eq!(result.total_extra(), 6);
    }

    #[test]
    fn test_unlistable_formulae_is_an_error() {
        let backend = machine();
        backend.break_listing(PackageKind::Formula);
        let client = backend.client();
        assert!(Cleaner::new(&client).diff_from_lists(&[], &[], &[]).is_err());
    }

    #[test]
    fn test_dry_run_removes_nothing() {
        let backend = machine();
        let client = backend.client();
        let cleaner = Cleaner::new(&client);
        let mut result = cleaner.diff_from_lists(&[], &[], &[]).unwrap();
        let before = result.clone();

        cleaner.execute(&mut result, true).unwrap();

        assert_eq!(result, before);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_execute_removes_in_kind_order() {
        let backend = machine();
        let client = backend.client();
        let cleaner = Cleaner::new(&client);
        let mut result = cleaner
            .diff_from_lists(&strings(&["git", "jq", "htop"]), &strings(&["iterm2"]), &strings(&["typescript"]))
            .unwrap();

        cleaner.execute(&mut result, false).unwrap();

        assert_eq!(
            backend.calls(),
            vec!["uninstall wget", "uninstall slack", "uninstall left-pad"]
        );
        assert_eq!(result.removed_formulae, strings(&["wget"]));
        assert_eq!(result.removed_casks, strings(&["slack"]));
        assert_eq!(result.removed_npm, strings(&["left-pad"]));
        assert_eq!(result.total_failed(), 0);
        assert!(result.is_clean());
    }

    #[test]
    fn test_failure_is_isolated_and_aggregated() {
        let backend = machine();
        backend.fail_on("wget");
        let client = backend.client();
        let cleaner = Cleaner::new(&client);
        let mut result = cleaner
            .diff_from_lists(&strings(&["git"]), &strings(&["iterm2", "slack"]), &strings(&["typescript"]))
            .unwrap();

        let mut reported = Vec::new();
        let err = cleaner
            .execute_with(&mut result, false, |pkg, outcome| {
                reported.push((pkg.name.clone(), outcome.is_ok()));
            })
            .unwrap_err();

        assert!(matches!(err, Error::PartialRemoval { failed: 1, attempted: 4 }));
        assert_eq!(result.failed_formulae, strings(&["wget"]));
        assert_eq!(result.removed_formulae, strings(&["jq", "htop"]));
        assert_eq!(result.removed_npm, strings(&["left-pad"]));
        assert_eq!(reported.len(), 4);
        assert_eq!(reported[0], ("wget".to_string(), false));
        assert_eq!(result.total_extra(), 0);
    }

    #[test]
    fn test_execute_twice_attempts_nothing_more() {
        let backend = machine();
        backend.fail_on("git");
        let client = backend.client();
        let cleaner = Cleaner::new(&client);
        let mut result = cleaner
            .diff_from_lists(&strings(&["jq", "htop"]), &strings(&["iterm2", "slack"]), &strings(&["typescript", "left-pad"]))
            .unwrap();

        let first = cleaner.execute(&mut result, false).unwrap_err();
        assert!(matches!(first, Error::PartialRemoval { failed: 1, attempted: 2 }));

        cleaner.execute(&mut result, false).unwrap();

        assert_eq!(backend.calls(), vec!["uninstall git", "uninstall wget"]);
        assert_eq!(result.removed_formulae, strings(&["wget"]));
        assert_eq!(result.failed_formulae, strings(&["git"]));
    }

    #[test]
    fn test_same_name_in_other_kind_stays_in_its_own_category() {
        let backend = FakeBackend::with_installed(PackageKind::Formula, &["git"]);
        backend.add_installed(PackageKind::Cask, &["docker"]);
        let client = backend.client();

        let result = Cleaner::new(&client)
            .diff_from_lists(&strings(&["git", "docker"]), &[], &[])
            .unwrap();

        assert_eq!(result.extra_casks, strings(&["docker"]));
        assert!(result.extra_formulae.is_empty());
        assert!(result.extra_npm.is_empty());
    }

    #[test]
    fn test_extras_never_leak_across_kinds() {
        let current = PackageSet {
            formulae: strings(&["docker", "node"]),
            casks: strings(&["docker"]),
            taps: Vec::new(),
            npm: strings(&["node"]),
        };
        let result = CleanResult::between(&current, &[], &strings(&["docker"]), &strings(&["node"]));

        assert_eq!(result.extra_formulae, strings(&["docker", "node"]));
        assert!(result.extra_casks.is_empty());
        assert!(result.extra_npm.is_empty());
    }

    #[test]
    fn test_duplicate_extras_removed_once() {
        let backend = machine();
        let client = backend.client();
        let mut result = CleanResult {
            extra_formulae: strings(&["wget", "wget"]),
            ..CleanResult::default()
        };

        Cleaner::new(&client).execute(&mut result, false).unwrap();
        assert_eq!(backend.calls(), vec!["uninstall wget"]);
        assert_eq!(result.removed_formulae, strings(&["wget"]));
    }
}
