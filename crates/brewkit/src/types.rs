//! Core types for package-manager operations.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of package handled by a [`Backend`](crate::backend::Backend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Homebrew tap (third-party repository)
    Tap,
    /// Homebrew formula (CLI tool)
    Formula,
    /// Homebrew cask (GUI application)
    Cask,
    /// Global npm package
    Npm,
}

impl PackageKind {
    /// All kinds, in installation order.
    pub const ALL: [Self; 4] = [Self::Tap, Self::Formula, Self::Cask, Self::Npm];

    /// Short lowercase label used in output and serialized forms.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Formula => "formula",
            Self::Cask => "cask",
            Self::Npm => "npm",
        }
    }

    /// Plural label for summaries ("formulae", "casks", ...).
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Tap => "taps",
            Self::Formula => "formulae",
            Self::Cask => "casks",
            Self::Npm => "npm packages",
        }
    }

    /// Parse a kind from its label. Accepts "brew" and "cli" as formula aliases.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tap" => Some(Self::Tap),
            "formula" | "brew" | "cli" => Some(Self::Formula),
            "cask" => Some(Self::Cask),
            "npm" => Some(Self::Npm),
            _ => None,
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single named package of a given kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    /// Package name (e.g., "git", "homebrew/cask-fonts", "typescript")
    pub name: String,
    /// Kind of package
    pub kind: PackageKind,
}

impl Package {
    /// Create a new package with the given name and kind.
    pub fn new(name: impl Into<String>, kind: PackageKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a tap package.
    pub fn tap(name: impl Into<String>) -> Self {
        Self::new(name, PackageKind::Tap)
    }

    /// Create a formula package.
    pub fn formula(name: impl Into<String>) -> Self {
        Self::new(name, PackageKind::Formula)
    }

    /// Create a cask package.
    pub fn cask(name: impl Into<String>) -> Self {
        Self::new(name, PackageKind::Cask)
    }

    /// Create a global npm package.
    pub fn npm(name: impl Into<String>) -> Self {
        Self::new(name, PackageKind::Npm)
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Configuration for retry logic.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Multiplier applied to the delay after every attempt
    pub backoff_factor: f64,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Create a retry config with custom attempts and base delay.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Default::default()
        }
    }

    /// Delay to wait after the given failed attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }

    /// A config that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_round_trip() {
        for kind in PackageKind::ALL {
            assert_eq!(PackageKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(PackageKind::from_label("brew"), Some(PackageKind::Formula));
        assert_eq!(PackageKind::from_label("CLI"), Some(PackageKind::Formula));
        assert_eq!(PackageKind::from_label("mas"), None);
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_attempts: 10,
            base_delay: Duration::from_secs(10),
            backoff_factor: 3.0,
            max_delay: Duration::from_secs(60),
        };
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(10));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(30));
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(60));
    }

    #[test]
    fn test_new_never_allows_zero_attempts() {
        assert_eq!(RetryConfig::new(0, Duration::ZERO).max_attempts, 1);
    }
}
