//! Feature coverage check.
//!
//! The installer silently drops components that no feature references, so
//! the emitter refuses to write a document where that would happen.

use crate::wix::error::CoverageError;
use crate::wix::model::Layout;
use std::collections::HashSet;

/// Verifies that every component is referenced by a feature and every
/// feature reference names a component.
///
/// # Errors
///
/// Returns [`CoverageError`] listing the offending identifiers.
pub fn verify_coverage(layout: &Layout) -> Result<(), CoverageError> {
    let units = layout.units();
    let declared: HashSet<&str> = units.iter().map(|u| u.id.as_str()).collect();
    let referenced: HashSet<&str> = layout
        .features
        .iter()
        .flat_map(|f| f.components.iter())
        .map(|id| id.as_str())
        .collect();

    let unreferenced: Vec<String> = units
        .iter()
        .map(|u| u.id.as_str())
        .filter(|id| !referenced.contains(id))
        .map(str::to_string)
        .collect();

    let mut dangling: Vec<String> = referenced
        .iter()
        .filter(|id| !declared.contains(*id))
        .map(|id| id.to_string())
        .collect();
    dangling.sort();

    if unreferenced.is_empty() && dangling.is_empty() {
        Ok(())
    } else {
        Err(CoverageError {
            unreferenced,
            dangling,
        })
    }
}
