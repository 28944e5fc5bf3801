//! Backend abstraction for package-manager operations.
//!
//! The [`Backend`] trait is the boundary to the external tools. The real
//! implementation shells out to `brew` and `npm`; tests substitute an
//! in-memory backend.

pub mod brew;

use crate::error::Result;
use crate::types::{Package, PackageKind};

/// Backend trait for package-manager operations.
///
/// Every method acts on a single item and reports success or failure for
/// that item only, so callers can isolate failures per package.
pub trait Backend: Send + Sync {
    /// Check if the package manager is available.
    fn is_available(&self) -> bool;

    /// Install one package.
    fn install(&self, package: &Package) -> Result<()>;

    /// Uninstall one package.
    fn uninstall(&self, package: &Package) -> Result<()>;

    /// List the names of installed packages of a given kind.
    ///
    /// Formulae are limited to those installed on request (not pulled in
    /// as dependencies).
    fn list_installed(&self, kind: PackageKind) -> Result<Vec<String>>;

    /// List installed taps.
    fn list_taps(&self) -> Result<Vec<String>> {
        self.list_installed(PackageKind::Tap)
    }

    /// List formulae installed on request.
    fn list_formulae(&self) -> Result<Vec<String>> {
        self.list_installed(PackageKind::Formula)
    }

    /// List installed casks.
    fn list_casks(&self) -> Result<Vec<String>> {
        self.list_installed(PackageKind::Cask)
    }

    /// List global npm packages.
    fn list_npm(&self) -> Result<Vec<String>> {
        self.list_installed(PackageKind::Npm)
    }
}
