//! Compare installed software against the catalog.
//!
//! Both functions are pure: identical inputs always produce identical
//! output, and neither can fail.

use crate::names::NameSet;
use crate::snapshot::{CatalogMatch, PackageSet};
use catalog::Catalog;
use std::collections::HashSet;

/// Minimum Jaccard similarity for [`detect_best_preset`] to name a preset.
///
/// A score equal to the threshold is accepted.
pub const MIN_PRESET_SIMILARITY: f64 = 0.3;

/// Split the installed formulae, casks and npm packages into names the
/// catalog knows and names it doesn't.
///
/// Duplicates are collapsed, keeping the first occurrence. The match rate is
/// `matched / (matched + unmatched)`, or 0 for an empty package set.
pub fn match_packages(catalog: &Catalog, packages: &PackageSet) -> CatalogMatch {
    let mut seen = HashSet::new();
    let mut result = CatalogMatch::default();

    for name in packages.installable() {
        if !seen.insert(name) {
            continue;
        }
        if catalog.contains(name) {
            result.matched.push(name.to_string());
        } else {
            result.unmatched.push(name.to_string());
        }
    }

    let total = result.matched.len() + result.unmatched.len();
    if total > 0 {
        result.match_rate = result.matched.len() as f64 / total as f64;
    }
    result
}

/// `|A ∩ B| / |A ∪ B|`, defined as 0 when both sets are empty.
pub fn jaccard_similarity(a: &NameSet, b: &NameSet) -> f64 {
    let union = a.union_len(b);
    if union == 0 {
        return 0.0;
    }
    a.intersection_len(b) as f64 / union as f64
}

/// The preset most similar to `packages`, or `None` if no preset reaches
/// [`MIN_PRESET_SIMILARITY`].
///
/// Ties go to the preset declared first in the catalog.
pub fn detect_best_preset<'c>(catalog: &'c Catalog, packages: &PackageSet) -> Option<&'c str> {
    let installed: NameSet = packages.installable().collect();

    let mut best: Option<(&str, f64)> = None;
    for preset in catalog.presets() {
        let wanted: NameSet = preset.package_names().collect();
        let score = jaccard_similarity(&installed, &wanted);
        log::trace!("Preset '{}' similarity {:.3}", preset.name, score);

        if best.is_none_or(|(_, top)| score > top) {
            best = Some((preset.name.as_str(), score));
        }
    }

    best.filter(|(_, score)| *score >= MIN_PRESET_SIMILARITY)
        .map(|(name, _)| name)
}
