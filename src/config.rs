use anyhow::{Context, Result, bail};
use brewkit::RetryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// User Settings
// ============================================================================

/// Optional `config.toml` in the config directory. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub install: InstallSettings,
    pub snapshot: SnapshotSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallSettings {
    /// Attempts per package; only network errors are retried
    pub retries: u32,
    /// Base delay between attempts, doubled each time
    pub retry_delay_secs: u64,
    /// Leave global npm packages alone
    pub skip_npm: bool,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_secs: 5,
            skip_npm: false,
        }
    }
}

impl InstallSettings {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.retries, Duration::from_secs(self.retry_delay_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotSettings {
    /// Override for the local snapshot location; `~` and `$VAR` are expanded
    pub path: Option<String>,
}

impl Settings {
    /// Load settings from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&crate::paths::settings_file()?)
    }

    /// Load settings from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Could not read {}", path.display()));
            }
        };

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Where `openboot snapshot` saves and `openboot clean` reads by default.
    pub fn local_snapshot_path(&self) -> Result<PathBuf> {
        match &self.snapshot.path {
            Some(p) => Ok(crate::paths::expand(p)),
            None => crate::paths::local_snapshot_file(),
        }
    }
}

// ============================================================================
// Remote Config
// ============================================================================

/// Keys that carry packages. A config must name at least one of them.
const PACKAGE_KEYS: [&str; 4] = ["packages", "casks", "taps", "npm"];

/// A desired state published from elsewhere, already downloaded to a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub username: String,
    pub slug: String,
    /// Preset the config was built from, if any
    pub preset: String,
    /// Formulae
    pub packages: Vec<String>,
    pub casks: Vec<String>,
    pub taps: Vec<String>,
    pub npm: Vec<String>,
}

impl RemoteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Decode a config. Anything but an object naming at least one package
    /// list is rejected, so a damaged file never reads as "want nothing".
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content).context("Config is not valid JSON")?;
        let Some(object) = value.as_object() else {
            bail!("Config must be a JSON object");
        };
        if !PACKAGE_KEYS.iter().any(|key| object.contains_key(*key)) {
            bail!("Config lists no packages (expected one of: {})", PACKAGE_KEYS.join(", "));
        }
        serde_json::from_value(value).context("Config has unexpected fields or types")
    }

    /// True when the config wants no formulae, casks or npm packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.casks.is_empty() && self.npm.is_empty()
    }

    /// "username/slug", or whichever part is set.
    pub fn label(&self) -> String {
        match (self.username.is_empty(), self.slug.is_empty()) {
            (false, false) => format!("{}/{}", self.username, self.slug),
            (false, true) => self.username.clone(),
            (true, false) => self.slug.clone(),
            (true, true) => "remote config".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
