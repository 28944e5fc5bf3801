//! # catalog
//!
//! Static reference data: the packages this tool knows about, grouped into
//! categories, and the presets built from them.
//!
//! The catalog is an explicitly constructed, immutable value. Binaries load
//! the embedded data once with [`Catalog::embedded`]; tests build synthetic
//! catalogs with [`Catalog::from_toml_str`] or [`Catalog::new`].
//!
//! ```
//! let catalog = catalog::Catalog::embedded().unwrap();
//! assert!(catalog.contains("git"));
//! assert!(catalog.preset("developer").is_some());
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{CatalogError, Result};
pub use types::{CatalogPackage, Category, Kind, Preset};

use std::collections::HashMap;
use types::CatalogFile;

/// Pseudo-preset meaning "no preset, free selection".
pub const SCRATCH_PRESET: &str = "scratch";

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.toml");

/// Where a package sits in the catalog.
#[derive(Debug, Clone, Copy)]
struct Entry {
    category: usize,
    kind: Kind,
}

/// The loaded, validated catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    presets: Vec<Preset>,
    index: HashMap<String, Entry>,
}

impl Catalog {
    /// Load the catalog compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    /// Parse and validate a catalog document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.categories, file.presets)
    }

    /// Build a catalog from parts, validating that package names are unique
    /// and that every preset references declared packages of the right kind.
    pub fn new(categories: Vec<Category>, presets: Vec<Preset>) -> Result<Self> {
        let mut index: HashMap<String, Entry> = HashMap::new();

        for (ci, category) in categories.iter().enumerate() {
            for package in &category.packages {
                if let Some(existing) = index.get(&package.name) {
                    return Err(CatalogError::DuplicatePackage {
                        name: package.name.clone(),
                        first: categories[existing.category].name.clone(),
                        second: category.name.clone(),
                    });
                }
                index.insert(
                    package.name.clone(),
                    Entry {
                        category: ci,
                        kind: package.kind,
                    },
                );
            }
        }

        for (pi, preset) in presets.iter().enumerate() {
            if preset.name == SCRATCH_PRESET {
                return Err(CatalogError::ReservedPresetName(preset.name.clone()));
            }
            if presets[..pi].iter().any(|p| p.name == preset.name) {
                return Err(CatalogError::DuplicatePreset(preset.name.clone()));
            }
            for (listed, names) in preset.lists() {
                for name in names {
                    let entry = index.get(name).ok_or_else(|| CatalogError::UnknownPackage {
                        preset: preset.name.clone(),
                        name: name.clone(),
                    })?;
                    if entry.kind != listed {
                        return Err(CatalogError::KindMismatch {
                            preset: preset.name.clone(),
                            name: name.clone(),
                            listed,
                            declared: entry.kind,
                        });
                    }
                }
            }
        }

        Ok(Self {
            categories,
            presets,
            index,
        })
    }

    /// All categories, in declared order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// All presets, from most conservative to most complete.
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// The category a package belongs to, if it is known.
    pub fn lookup_category(&self, name: &str) -> Option<&Category> {
        self.index.get(name).map(|e| &self.categories[e.category])
    }

    /// Whether the catalog knows this package.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The declared kind of a package.
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.index.get(name).map(|e| e.kind)
    }

    /// Whether the package is a known cask.
    pub fn is_cask(&self, name: &str) -> bool {
        self.kind_of(name) == Some(Kind::Cask)
    }

    /// Whether the package is a known global npm package.
    pub fn is_npm(&self, name: &str) -> bool {
        self.kind_of(name) == Some(Kind::Npm)
    }

    /// Every known package name, in category order.
    pub fn all_package_names(&self) -> Vec<&str> {
        self.categories
            .iter()
            .flat_map(|c| c.packages.iter().map(|p| p.name.as_str()))
            .collect()
    }

    /// Look up a preset by name. The scratch pseudo-preset has no entry.
    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }
}

/// Whether `name` is the free-selection pseudo-preset.
pub fn is_scratch(name: &str) -> bool {
    name == SCRATCH_PRESET
}
