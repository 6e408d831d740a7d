//! Nearest-UV search implementations
//!
//! Both searches resolve ties the same way: among all UV points whose squared
//! distance is within [`TIE_TOLERANCE`] of the minimum, the lowest UV id wins.

use drawmap_core::{UvPoint, UvSearch};
use kiddo::SquaredEuclidean;

/// Squared distances closer than this to the minimum count as ties
pub const TIE_TOLERANCE: f64 = 1e-12;

// Seams put hundreds of UVs on one axis value, which the bucketed mutable tree
// cannot split. The immutable tree is balanced over the whole table instead.
type UvTree = kiddo::ImmutableKdTree<f64, 2>;

/// KD-Tree over a UV table. Items are UV ids.
pub struct KdUvIndex {
    tree: Option<UvTree>,
    len: usize,
}

impl KdUvIndex {
    pub fn new(uvs: &[UvPoint]) -> Self {
        let points: Vec<[f64; 2]> = uvs.iter().map(|uv| [uv.x, uv.y]).collect();
        let tree = (!points.is_empty()).then(|| UvTree::new_from_slice(&points));
        Self {
            tree,
            len: uvs.len(),
        }
    }
}

impl UvSearch for KdUvIndex {
    fn nearest_uv(&self, query: &UvPoint) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let query = [query.x, query.y];
        let best = tree.nearest_one::<SquaredEuclidean>(&query).distance;

        // Gather every point tied with the nearest one and keep the lowest id
        tree
            .within::<SquaredEuclidean>(&query, best + 2.0 * TIE_TOLERANCE)
            .into_iter()
            .filter(|n| n.distance <= best + TIE_TOLERANCE)
            .map(|n| n.item as usize)
            .min()
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Simple brute force search for small UV tables
pub struct BruteForceUvIndex {
    uvs: Vec<UvPoint>,
}

impl BruteForceUvIndex {
    pub fn new(uvs: &[UvPoint]) -> Self {
        Self { uvs: uvs.to_vec() }
    }
}

impl UvSearch for BruteForceUvIndex {
    fn nearest_uv(&self, query: &UvPoint) -> Option<usize> {
        let distances: Vec<f64> = self
            .uvs
            .iter()
            .map(|uv| {
                let du = uv.x - query.x;
                let dv = uv.y - query.y;
                du * du + dv * dv
            })
            .collect();

        let best = distances.iter().copied().fold(f64::INFINITY, f64::min);
        distances.iter().position(|&d| d <= best + TIE_TOLERANCE)
    }

    fn len(&self) -> usize {
        self.uvs.len()
    }
}
