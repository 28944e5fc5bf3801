//! Snapshot model: a point-in-time record of a machine's installed software
//! and configuration.
//!
//! A snapshot is plain data. It is produced by [`capture`], by reading a
//! file with [`Snapshot::load`], or by decoding a payload with
//! [`Snapshot::from_json`]. Whenever a snapshot is loaded or decoded its
//! [`CatalogMatch`] is recomputed against the catalog in use.

pub mod capture;
pub mod macos;
pub mod probe;

pub use capture::{CaptureStep, StepReport, SystemProbe, capture, capture_with_progress};
pub use probe::LiveProbe;

use crate::error::{Error, Result};
use crate::fsutil;
use crate::matcher;
use brewkit::PackageKind;
use catalog::Catalog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Current schema version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_FILE_MODE: u32 = 0o644;

/// Installed package identifiers, by kind.
///
/// A missing kind decodes as empty, but an unknown key is rejected so a
/// misspelled kind is never read as "nothing wanted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSet {
    #[serde(default)]
    pub formulae: Vec<String>,
    #[serde(default)]
    pub casks: Vec<String>,
    #[serde(default)]
    pub taps: Vec<String>,
    #[serde(default)]
    pub npm: Vec<String>,
}

impl PackageSet {
    /// The list holding packages of `kind`.
    pub fn list(&self, kind: PackageKind) -> &[String] {
        match kind {
            PackageKind::Tap => &self.taps,
            PackageKind::Formula => &self.formulae,
            PackageKind::Cask => &self.casks,
            PackageKind::Npm => &self.npm,
        }
    }

    /// Formulae, casks and npm packages in that order. Taps are repositories,
    /// not packages, and are excluded.
    pub fn installable(&self) -> impl Iterator<Item = &str> {
        self.formulae
            .iter()
            .chain(&self.casks)
            .chain(&self.npm)
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.formulae.is_empty() && self.casks.is_empty() && self.taps.is_empty() && self.npm.is_empty()
    }
}

/// A single macOS preference value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacOsPref {
    pub domain: String,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub desc: String,
}

/// Shell environment summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellProfile {
    #[serde(default)]
    pub default_shell: String,
    #[serde(default)]
    pub oh_my_zsh: bool,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub plugins: Vec<String>,
}

/// Global git identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentity {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
}

/// An installed development tool and its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevTool {
    pub name: String,
    pub version: String,
}

/// How much of a snapshot's software the catalog knows about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatch {
    #[serde(default)]
    pub matched: Vec<String>,
    #[serde(default)]
    pub unmatched: Vec<String>,
    #[serde(default)]
    pub match_rate: f64,
}

/// A captured or desired machine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub hostname: String,
    pub packages: PackageSet,
    #[serde(default)]
    pub macos_prefs: Vec<MacOsPref>,
    #[serde(default)]
    pub shell: ShellProfile,
    #[serde(default)]
    pub git: GitIdentity,
    #[serde(default)]
    pub dev_tools: Vec<DevTool>,
    /// Name of the closest preset, empty if none is close enough.
    #[serde(default)]
    pub matched_preset: String,
    #[serde(default)]
    pub catalog_match: CatalogMatch,
}

impl Snapshot {
    /// An empty snapshot stamped with the current time.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            captured_at: Utc::now(),
            hostname: hostname.into(),
            packages: PackageSet::default(),
            macos_prefs: Vec::new(),
            shell: ShellProfile::default(),
            git: GitIdentity::default(),
            dev_tools: Vec::new(),
            matched_preset: String::new(),
            catalog_match: CatalogMatch::default(),
        }
    }

    /// Read a snapshot file.
    ///
    /// A missing file is [`Error::SnapshotNotFound`]; undecodable content is
    /// [`Error::MalformedSnapshot`]. Content is never defaulted.
    pub fn load(path: &Path, catalog: &Catalog) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::SnapshotNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        log::debug!("Loaded snapshot from {}", path.display());
        Self::decode(&content, &path.display().to_string(), catalog)
    }

    /// Decode a snapshot delivered as JSON text (e.g. an uploaded config).
    pub fn from_json(content: &str, catalog: &Catalog) -> Result<Self> {
        Self::decode(content, "snapshot payload", catalog)
    }

    fn decode(content: &str, origin: &str, catalog: &Catalog) -> Result<Self> {
        let mut snapshot: Snapshot =
            serde_json::from_str(content).map_err(|source| Error::MalformedSnapshot {
                origin: origin.to_string(),
                source,
            })?;
        snapshot.catalog_match = matcher::match_packages(catalog, &snapshot.packages);
        Ok(snapshot)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| Error::Encode {
            what: "snapshot",
            source,
        })
    }

    /// Write the snapshot to `path`, replacing any existing file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = self.to_json_pretty()?;
        json.push('\n');
        fsutil::write_atomic(path, json.as_bytes(), SNAPSHOT_FILE_MODE)
    }
}
