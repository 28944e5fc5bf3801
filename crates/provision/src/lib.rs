//! # provision
//!
//! Workstation provisioning core:
//! - [`snapshot`]: capture a machine's packages and settings, persist and
//!   reload them
//! - [`matcher`]: compare installed packages with the catalog and infer the
//!   closest preset
//! - [`cleaner`]: remove packages the desired state does not declare
//! - [`install_state`] and [`installer`]: resumable installs backed by a
//!   persisted ledger
//!
//! All operations are synchronous and run on the caller's thread.

pub mod cleaner;
pub mod error;
mod fsutil;
pub mod install_state;
pub mod installer;
pub mod matcher;
pub mod names;
pub mod snapshot;

#[cfg(test)]
mod testutil;

pub use cleaner::{CleanResult, Cleaner};
pub use error::{Error, Result};
pub use install_state::InstallState;
pub use installer::{InstallOutcome, InstallPlan, InstallReport, Installer};
pub use names::NameSet;
pub use snapshot::{CatalogMatch, PackageSet, Snapshot};
