//! crates/mm_pipeline/src/unify.rs
//! Merge each constituency's legacy boundaries into one.

use mm_algo::{union_boundaries, GeometryIndex};
use mm_core::TargetConstituency;
use tracing::{debug, info};

use crate::validate::{check_boundaries, ValidateError};

/// Set `geometry` on every constituency to the union of its matched ids' boundaries.
pub fn unify_boundaries(constituencies: &mut [TargetConstituency], geometries: &GeometryIndex) -> Result<(), ValidateError> {
    check_boundaries(constituencies, geometries)?;

    for c in constituencies.iter_mut() {
        let parts = c.formed_from_ids.iter().filter_map(|id| geometries.get(id));
        let merged = union_boundaries(parts);
        debug!(constituency = %c.name, polygons = merged.0.len(), "unified boundary");
        c.geometry = Some(merged);
    }
    info!(constituencies = constituencies.len(), "unified boundaries");
    Ok(())
}
