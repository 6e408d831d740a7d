//! UV map combination
//!
//! Secondary UV layouts of the same mesh mark the parts that belong on the
//! location drawing by keeping them inside the unit square; everything else has
//! been moved outside it. Combining appends only the in-bounds rows of each
//! secondary layout after the base map, so new UV ids continue the base numbering.

use drawmap_core::{uv_in_bounds, Error, Result, UvMap, UvPoint};
use tracing::debug;

/// Row numbers of the UV points strictly inside [0,1] x [0,1]
pub fn find_in_bounds_uvs(uvs: &[UvPoint]) -> Vec<usize> {
    uvs.iter()
        .enumerate()
        .filter(|(_, uv)| uv_in_bounds(uv))
        .map(|(idx, _)| idx)
        .collect()
}

/// Merge a base UV map with the in-bounds rows of each addition.
///
/// Vertex ids are copied unchanged; only UV ids are renumbered, as
/// `base.len(), base.len() + 1, ...` in addition order then row order.
pub fn combine(base: &UvMap, additions: &[UvMap]) -> Result<UvMap> {
    base.validate()?;
    for (idx, addition) in additions.iter().enumerate() {
        if addition.uvs.len() != addition.lookup.len() {
            return Err(Error::Validation(format!(
                "addition {} has {} UV rows but {} lookup rows",
                idx,
                addition.uvs.len(),
                addition.lookup.len()
            )));
        }
    }

    let mut combined = base.clone();
    for (idx, addition) in additions.iter().enumerate() {
        let kept = find_in_bounds_uvs(&addition.uvs);
        debug!(
            addition = idx,
            kept = kept.len(),
            moved = addition.len() - kept.len(),
            "Appending in-bounds UV rows"
        );

        combined.uvs.reserve(kept.len());
        combined.lookup.reserve(kept.len());
        for row in kept {
            combined.uvs.push(addition.uvs[row]);
            combined.lookup.push(addition.lookup[row]);
        }
    }

    debug!(
        base = base.len(),
        combined = combined.len(),
        "Combined UV maps"
    );
    Ok(combined)
}
