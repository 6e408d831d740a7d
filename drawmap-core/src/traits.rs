//! Core traits for drawmap

use crate::{error::Result, mesh::MeshData, point::*, variant::MeshVariant};
use std::sync::Arc;

/// Trait for nearest-UV search over a UV table
pub trait UvSearch {
    /// Find the UV id closest to `query`, ties resolved to the lowest id.
    /// Returns `None` only when the table is empty.
    fn nearest_uv(&self, query: &UvPoint) -> Option<usize>;

    /// Number of indexed UV points
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Geodesic distance and path queries on one fixed mesh.
///
/// Implementations must be deterministic for a fixed mesh and input pair.
pub trait GeodesicSolver {
    /// Distance from `source` to every vertex, indexed by vertex id
    fn compute_distance_field(&self, source: usize) -> Result<Vec<f64>>;

    /// An ordered sequence of surface points from `source` to `target`.
    /// The path is feasible but not guaranteed to be the shortest.
    fn find_path(&self, source: usize, target: usize) -> Result<Vec<Point3d>>;
}

/// Builds solver handles bound to a mesh's vertex and face tables
pub trait GeodesicBackend {
    type Solver: GeodesicSolver;

    fn build(&self, mesh: &MeshData) -> Result<Self::Solver>;
}

/// Source of read-only mesh data per variant
pub trait MeshStore {
    fn load_variant(&self, variant: MeshVariant) -> Result<Arc<MeshData>>;
}

impl<T: MeshStore + ?Sized> MeshStore for &T {
    fn load_variant(&self, variant: MeshVariant) -> Result<Arc<MeshData>> {
        (**self).load_variant(variant)
    }
}

impl<T: GeodesicBackend + ?Sized> GeodesicBackend for &T {
    type Solver = T::Solver;

    fn build(&self, mesh: &MeshData) -> Result<Self::Solver> {
        (**self).build(mesh)
    }
}
