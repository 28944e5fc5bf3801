//! # brewkit
//!
//! Single-item package operations over Homebrew and global npm.
//!
//! This crate provides:
//! - Listing installed taps, formulae (installed on request), casks and
//!   global npm packages
//! - Installing and uninstalling one package at a time, with errors
//!   classified per item
//! - Retry with exponential backoff for transient network failures
//!
//! ## Example
//!
//! ```no_run
//! use brewkit::{Client, Package};
//!
//! let client = Client::new().expect("Homebrew not available");
//! for name in client.list_casks().expect("brew list failed") {
//!     println!("cask: {name}");
//! }
//! client.uninstall(&Package::cask("firefox")).expect("uninstall failed");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod retry;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use types::{Package, PackageKind, RetryConfig};

use backend::{Backend, brew::BrewBackend};

/// High-level client for package-manager operations.
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a new Client backed by the real `brew`/`npm` tools.
    ///
    /// Returns an error if Homebrew is not installed.
    pub fn new() -> Result<Self> {
        Ok(Self {
            backend: Box::new(BrewBackend::new()?),
        })
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Check if the package manager is available.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Install a package.
    pub fn install(&self, package: &Package) -> Result<()> {
        self.backend.install(package)
    }

    /// Install a package, retrying transient failures.
    pub fn install_with_retry(&self, package: &Package, config: &RetryConfig) -> Result<()> {
        retry::with_retry(config, Some(&retry::LogObserver), || {
            self.backend.install(package)
        })
    }

    /// Uninstall a package.
    pub fn uninstall(&self, package: &Package) -> Result<()> {
        self.backend.uninstall(package)
    }

    /// List installed package names of a given kind.
    pub fn list_installed(&self, kind: PackageKind) -> Result<Vec<String>> {
        self.backend.list_installed(kind)
    }

    /// List installed taps.
    pub fn list_taps(&self) -> Result<Vec<String>> {
        self.backend.list_taps()
    }

    /// List formulae installed on request.
    pub fn list_formulae(&self) -> Result<Vec<String>> {
        self.backend.list_formulae()
    }

    /// List installed casks.
    pub fn list_casks(&self) -> Result<Vec<String>> {
        self.backend.list_casks()
    }

    /// List global npm packages.
    pub fn list_npm(&self) -> Result<Vec<String>> {
        self.backend.list_npm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FlakyBackend {
        failures_left: Mutex<u32>,
    }

    impl Backend for FlakyBackend {
        fn is_available(&self) -> bool {
            true
        }

        fn install(&self, _package: &Package) -> Result<()> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(Error::Network {
                    message: "connection reset".to_string(),
                });
            }
            Ok(())
        }

        fn uninstall(&self, package: &Package) -> Result<()> {
            Err(Error::NotFound {
                name: package.name.clone(),
            })
        }

        fn list_installed(&self, kind: PackageKind) -> Result<Vec<String>> {
            Ok(vec![format!("{kind}-one")])
        }
    }

    fn client(failures: u32) -> Client {
        Client::with_backend(Box::new(FlakyBackend {
            failures_left: Mutex::new(failures),
        }))
    }

    #[test]
    fn test_package_constructors() {
        assert_eq!(Package::tap("homebrew/cask").kind, PackageKind::Tap);
        assert_eq!(Package::formula("git").kind, PackageKind::Formula);
        assert_eq!(Package::cask("firefox").kind, PackageKind::Cask);
        assert_eq!(Package::npm("typescript").kind, PackageKind::Npm);
    }

    #[test]
    fn test_list_helpers_dispatch_by_kind() {
        let client = client(0);
        assert_eq!(client.list_taps().unwrap(), vec!["tap-one"]);
        assert_eq!(client.list_formulae().unwrap(), vec!["formula-one"]);
        assert_eq!(client.list_casks().unwrap(), vec!["cask-one"]);
        assert_eq!(client.list_npm().unwrap(), vec!["npm-one"]);
    }

    #[test]
    fn test_install_with_retry_recovers() {
        let client = client(1);
        let config = RetryConfig::new(2, std::time::Duration::from_millis(1));
        assert!(client.install_with_retry(&Package::formula("jq"), &config).is_ok());
    }

    #[test]
    fn test_install_without_retry_fails() {
        let client = client(1);
        let err = client
            .install_with_retry(&Package::formula("jq"), &RetryConfig::no_retry())
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
