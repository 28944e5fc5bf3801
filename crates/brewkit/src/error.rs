//! Error types for package-manager operations.
//!
//! Failures reported by `brew` and `npm` are classified from their stderr so
//! callers can decide whether to retry, ignore, or report an item.

use thiserror::Error;

/// Broad classes of package-manager failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient, retryable)
    Network,
    /// Package not found in any tap or registry
    NotFound,
    /// Dependency or link conflict
    Conflict,
    /// Permission denied
    Permission,
    /// Package is already installed
    AlreadyInstalled,
    /// The package-manager executable is missing
    ToolMissing,
    /// Anything else
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Whether the operation can be treated as done despite the error.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::AlreadyInstalled)
    }

    /// Actionable advice for this category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::NotFound => "Verify the package name or add the required tap",
            Self::Conflict => "Remove the conflicting package or its dependents first",
            Self::Permission => "Check ownership of the Homebrew prefix or npm global dir",
            Self::AlreadyInstalled => "No action needed",
            Self::ToolMissing => "Install Homebrew from https://brew.sh (npm ships with node)",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while invoking the package manager.
#[derive(Debug, Error)]
pub enum Error {
    /// Network-related error (connection, timeout, DNS, etc.)
    #[error("network error: {message}")]
    Network {
        /// Trimmed stderr of the failed command
        message: String,
    },

    /// Package not found
    #[error("package not found: {name}")]
    NotFound {
        /// Name of the package that could not be found
        name: String,
    },

    /// Dependency or link conflict
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// Permission denied
    #[error("permission denied: {message}")]
    Permission {
        /// Details about what permission was denied
        message: String,
    },

    /// Package is already installed
    #[error("already installed: {name}")]
    AlreadyInstalled {
        /// Name of the already-installed package
        name: String,
    },

    /// Homebrew is not installed or not found in PATH
    #[error("Homebrew not found. Install it from https://brew.sh")]
    BrewNotFound,

    /// npm is not installed or not found in PATH
    #[error("npm not found. Install node to manage global npm packages")]
    NpmNotFound,

    /// Command execution failed for an unclassified reason
    #[error("{message}")]
    CommandFailed {
        /// Which command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network { .. } => ErrorCategory::Network,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Conflict { .. } => ErrorCategory::Conflict,
            Error::Permission { .. } => ErrorCategory::Permission,
            Error::AlreadyInstalled { .. } => ErrorCategory::AlreadyInstalled,
            Error::BrewNotFound | Error::NpmNotFound => ErrorCategory::ToolMissing,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Whether this error can be safely ignored.
    pub fn is_ignorable(&self) -> bool {
        self.category().is_ignorable()
    }

    /// Classify the stderr of a failed `brew` or `npm` invocation.
    pub fn from_output(tool: &str, stderr: &str, package_name: Option<&str>) -> Self {
        let lower = stderr.to_lowercase();
        let name = || package_name.unwrap_or("unknown").to_string();

        let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if any(&[
            "curl",
            "could not resolve",
            "connection refused",
            "timed out",
            "network",
            "econnreset",
            "etimedout",
            "enotfound",
            "failed to download",
            "sha256 mismatch",
        ]) {
            return Error::Network {
                message: stderr.trim().to_string(),
            };
        }

        if any(&[
            "no available formula",
            "no formulae found",
            "no cask with this name",
            "no such keg",
            "is not installed",
            "e404",
            "404 not found",
        ]) {
            return Error::NotFound { name: name() };
        }

        if any(&["already installed", "is already an installed"]) {
            return Error::AlreadyInstalled { name: name() };
        }

        if any(&["conflict", "is required by", "depends on", "refusing to uninstall"]) {
            return Error::Conflict {
                message: stderr.trim().to_string(),
            };
        }

        if any(&[
            "permission denied",
            "operation not permitted",
            "eacces",
            "cannot write",
        ]) {
            return Error::Permission {
                message: stderr.trim().to_string(),
            };
        }

        Error::CommandFailed {
            message: format!(
                "{tool} command failed{}",
                package_name
                    .map(|n| format!(" for {n}"))
                    .unwrap_or_default()
            ),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Result type for package-manager operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_is_retryable() {
        let err = Error::from_output("brew", "curl: (6) Could not resolve host", Some("wget"));
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());

        let err = Error::from_output("npm", "npm ERR! code ECONNRESET", Some("typescript"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found() {
        let err = Error::from_output(
            "brew",
            "Error: No available formula with the name \"foo\"",
            Some("foo"),
        );
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(!err.is_retryable());

        let err = Error::from_output("npm", "npm ERR! code E404", Some("nope"));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_already_installed_is_ignorable() {
        let err = Error::from_output("brew", "Warning: git is already installed", Some("git"));
        assert_eq!(err.category(), ErrorCategory::AlreadyInstalled);
        assert!(err.is_ignorable());
    }

    #[test]
    fn test_uninstall_conflict() {
        let err = Error::from_output(
            "brew",
            "Error: Refusing to uninstall openssl@3 because it is required by wget",
            Some("openssl@3"),
        );
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_unclassified_mentions_tool_and_package() {
        let err = Error::from_output("npm", "something odd", Some("eslint"));
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.to_string(), "npm command failed for eslint");
    }

    #[test]
    fn test_missing_tools_share_category() {
        assert_eq!(Error::BrewNotFound.category(), ErrorCategory::ToolMissing);
        assert_eq!(Error::NpmNotFound.category(), ErrorCategory::ToolMissing);
    }
}
