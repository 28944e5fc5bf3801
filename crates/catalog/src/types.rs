//! Catalog data types, as declared in the embedded TOML.

use serde::{Deserialize, Serialize};

/// How a catalog package is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Homebrew formula
    Cli,
    /// Homebrew cask
    Cask,
    /// Global npm package
    Npm,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Cli => "cli",
            Kind::Cask => "cask",
            Kind::Npm => "npm",
        })
    }
}

/// A known package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPackage {
    pub name: String,
    pub kind: Kind,
    #[serde(default)]
    pub description: String,
}

/// A named group of packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "package")]
    pub packages: Vec<CatalogPackage>,
}

/// A fixed bundle of packages representing a common setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Lookup key ("minimal", "developer", ...)
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Formulae
    #[serde(default)]
    pub cli: Vec<String>,
    #[serde(default)]
    pub cask: Vec<String>,
    #[serde(default)]
    pub npm: Vec<String>,
}

impl Preset {
    /// Every package name in the preset: CLI, then casks, then npm.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.cli
            .iter()
            .chain(&self.cask)
            .chain(&self.npm)
            .map(String::as_str)
    }

    /// Lists paired with the kind they declare.
    pub(crate) fn lists(&self) -> [(Kind, &[String]); 3] {
        [
            (Kind::Cli, self.cli.as_slice()),
            (Kind::Cask, self.cask.as_slice()),
            (Kind::Npm, self.npm.as_slice()),
        ]
    }
}

/// On-disk shape of the catalog document.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogFile {
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,
    #[serde(default, rename = "preset")]
    pub presets: Vec<Preset>,
}
