//! Persistent record of packages this tool has confirmed installed.
//!
//! Every mark is written to disk immediately, so an interrupted install run
//! loses at most the package that was in flight. Re-running skips
//! everything already recorded.

use crate::error::{Error, Result};
use crate::fsutil;
use crate::names::NameSet;
use brewkit::PackageKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const STATE_FILE_MODE: u32 = 0o600;

// ============================================================================
// State Structure
// ============================================================================

/// Installed-package ledger, bound to the file it was loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallState {
    /// Last time the state was saved
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,

    #[serde(default, rename = "installed_formulae")]
    formulae: NameSet,

    #[serde(default, rename = "installed_casks")]
    casks: NameSet,

    #[serde(default, rename = "installed_npm")]
    npm: NameSet,

    #[serde(skip)]
    path: PathBuf,
}

impl InstallState {
    /// An empty ledger that will be saved to `path`.
    pub fn empty_at(path: impl Into<PathBuf>) -> Self {
        Self {
            last_updated: Utc::now(),
            formulae: NameSet::new(),
            casks: NameSet::new(),
            npm: NameSet::new(),
            path: path.into(),
        }
    }

    /// Load the ledger at `path`.
    ///
    /// A missing file yields an empty ledger. A file that exists but cannot
    /// be decoded is [`Error::CorruptState`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Install state file does not exist, using empty state");
                return Ok(Self::empty_at(path));
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        let mut state: InstallState =
            serde_json::from_str(&content).map_err(|source| Error::CorruptState {
                path: path.to_path_buf(),
                source,
            })?;
        state.path = path.to_path_buf();

        log::debug!(
            "Loaded install state from {} ({} formulae, {} casks, {} npm)",
            path.display(),
            state.formulae.len(),
            state.casks.len(),
            state.npm.len()
        );
        Ok(state)
    }

    /// Like [`InstallState::load`], but always returns a usable ledger.
    ///
    /// On failure the ledger is empty and the error is returned alongside
    /// it, so the caller decides whether to continue.
    pub fn load_lenient(path: &Path) -> (Self, Option<Error>) {
        match Self::load(path) {
            Ok(state) => (state, None),
            Err(e) => (Self::empty_at(path), Some(e)),
        }
    }

    /// File this ledger is saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the ledger atomically, updating `last_updated`.
    pub fn save(&mut self) -> Result<()> {
        self.last_updated = Utc::now();
        let mut json = serde_json::to_string_pretty(self).map_err(|source| Error::Encode {
            what: "install state",
            source,
        })?;
        json.push('\n');

        fsutil::write_atomic(&self.path, json.as_bytes(), STATE_FILE_MODE)?;
        log::debug!("Saved install state to {}", self.path.display());
        Ok(())
    }

    /// Forget everything and persist the empty ledger.
    pub fn reset(&mut self) -> Result<()> {
        self.formulae.clear();
        self.casks.clear();
        self.npm.clear();
        self.save()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_formula_installed(&self, name: &str) -> bool {
        self.formulae.contains(name)
    }

    pub fn is_cask_installed(&self, name: &str) -> bool {
        self.casks.contains(name)
    }

    pub fn is_npm_installed(&self, name: &str) -> bool {
        self.npm.contains(name)
    }

    /// Whether `name` is recorded for `kind`. Taps are never recorded.
    pub fn is_installed(&self, kind: PackageKind, name: &str) -> bool {
        self.set(kind).is_some_and(|set| set.contains(name))
    }

    /// Recorded names for `kind`, sorted.
    pub fn names(&self, kind: PackageKind) -> Vec<&str> {
        self.set(kind).map(|set| set.iter().collect()).unwrap_or_default()
    }

    pub fn count(&self, kind: PackageKind) -> usize {
        self.set(kind).map_or(0, NameSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.formulae.is_empty() && self.casks.is_empty() && self.npm.is_empty()
    }

    fn set(&self, kind: PackageKind) -> Option<&NameSet> {
        match kind {
            PackageKind::Formula => Some(&self.formulae),
            PackageKind::Cask => Some(&self.casks),
            PackageKind::Npm => Some(&self.npm),
            PackageKind::Tap => None,
        }
    }

    // ========================================================================
    // Marks
    // ========================================================================

    /// Record a formula and persist.
    pub fn mark_formula(&mut self, name: &str) -> Result<()> {
        self.formulae.insert(name);
        self.save()
    }

    /// Record a cask and persist.
    pub fn mark_cask(&mut self, name: &str) -> Result<()> {
        self.casks.insert(name);
        self.save()
    }

    /// Record an npm package and persist.
    pub fn mark_npm(&mut self, name: &str) -> Result<()> {
        self.npm.insert(name);
        self.save()
    }

    /// Record `name` under `kind` and persist. Taps are ignored.
    pub fn mark(&mut self, kind: PackageKind, name: &str) -> Result<()> {
        match kind {
            PackageKind::Formula => self.mark_formula(name),
            PackageKind::Cask => self.mark_cask(name),
            PackageKind::Npm => self.mark_npm(name),
            PackageKind::Tap => Ok(()),
        }
    }
}
