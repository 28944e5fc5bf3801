//! Errors raised while loading catalog data.

use thiserror::Error;

/// Catalog loading and validation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The TOML document could not be decoded.
    #[error("invalid catalog data: {0}")]
    Parse(#[from] toml::de::Error),

    /// A package name is declared more than once across categories.
    #[error("package '{name}' is declared in both '{first}' and '{second}'")]
    DuplicatePackage {
        /// Package name
        name: String,
        /// Category of the first declaration
        first: String,
        /// Category of the repeated declaration
        second: String,
    },

    /// Two presets share a name.
    #[error("preset '{0}' is declared more than once")]
    DuplicatePreset(String),

    /// A preset uses the reserved free-selection name.
    #[error("preset name '{0}' is reserved")]
    ReservedPresetName(String),

    /// A preset references a package the catalog does not declare.
    #[error("preset '{preset}' references unknown package '{name}'")]
    UnknownPackage {
        /// Preset name
        preset: String,
        /// Referenced package
        name: String,
    },

    /// A preset lists a package under the wrong kind.
    #[error("preset '{preset}' lists '{name}' as {listed}, but the catalog declares it as {declared}")]
    KindMismatch {
        /// Preset name
        preset: String,
        /// Referenced package
        name: String,
        /// Kind of the preset list it appeared in
        listed: crate::Kind,
        /// Kind declared by the catalog
        declared: crate::Kind,
    },
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
