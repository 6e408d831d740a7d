//! Geodesic query session
//!
//! A [`GeodesicSession`] walks through a fixed sequence of states:
//!
//! ```text
//! Unloaded --load--> Loaded --load_points--> PointsSet --compute_distances--> DistancesReady
//!                                                      --compute_paths------> PathsReady
//! ```
//!
//! Distances and paths may be computed in either order once points are set.
//! The mesh itself is shared read-only; the session only owns the current
//! batch and its results. [`GeodesicSession::reset`] returns to `Loaded`.

use crate::mapping::CoordinateMapper;
use crate::region::{RegionExtractor, SurfacePatch};
use drawmap_core::{
    Error, GeodesicBackend, GeodesicSolver, MeshData, MeshStore, MeshVariant, PixelPoint, Point3d,
    RegionOptions, Result, SessionOptions,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Unloaded,
    Loaded,
    PointsSet,
    DistancesReady,
    PathsReady,
}

impl SessionState {
    fn has_points(self) -> bool {
        matches!(
            self,
            SessionState::PointsSet | SessionState::DistancesReady | SessionState::PathsReady
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unloaded => "unloaded",
            SessionState::Loaded => "loaded",
            SessionState::PointsSet => "points-set",
            SessionState::DistancesReady => "distances-ready",
            SessionState::PathsReady => "paths-ready",
        };
        f.write_str(name)
    }
}

/// Outcome of filtering a point batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PointsSummary {
    pub retained: usize,
    pub dropped: usize,
}

/// Everything [`GeodesicSession::analyze`] computes for one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: PointsSummary,
    /// One distance per retained row, in input order
    pub distances: Vec<f64>,
    pub paths: Option<BTreeMap<String, Vec<Point3d>>>,
}

struct LoadedMesh<T> {
    variant: MeshVariant,
    mesh: Arc<MeshData>,
    mapper: CoordinateMapper,
    solver: T,
}

/// Stateful geodesic analysis over one mesh variant
pub struct GeodesicSession<S: MeshStore, B: GeodesicBackend> {
    store: S,
    backend: B,
    options: SessionOptions,
    state: SessionState,
    loaded: Option<LoadedMesh<B::Solver>>,
    pairs: Vec<(usize, usize)>,
    distances: Option<Vec<f64>>,
    paths: Option<BTreeMap<String, Vec<Point3d>>>,
}

impl<S: MeshStore, B: GeodesicBackend> GeodesicSession<S, B> {
    pub fn new(store: S, backend: B, options: SessionOptions) -> Self {
        Self {
            store,
            backend,
            options,
            state: SessionState::Unloaded,
            loaded: None,
            pairs: Vec::new(),
            distances: None,
            paths: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn variant(&self) -> Option<MeshVariant> {
        self.loaded.as_ref().map(|l| l.variant)
    }

    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        self.loaded.as_ref().map(|l| &l.mesh)
    }

    /// Start and end vertex of every retained row
    pub fn vertex_pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn distances(&self) -> Option<&[f64]> {
        self.distances.as_deref()
    }

    pub fn paths(&self) -> Option<&BTreeMap<String, Vec<Point3d>>> {
        self.paths.as_ref()
    }

    /// Load a mesh by name, e.g. `"male_right"` or `"Female Left Arm"`
    pub fn load(&mut self, mesh_name: &str) -> Result<()> {
        self.require_unloaded("load")?;
        let variant: MeshVariant = mesh_name.parse()?;
        self.load_variant(variant)
    }

    pub fn load_variant(&mut self, variant: MeshVariant) -> Result<()> {
        self.require_unloaded("load")?;

        let mesh = self.store.load_variant(variant)?;
        let mapper = CoordinateMapper::new(mesh.uv_map(), self.options.mapping)?;
        let solver = self.backend.build(&mesh)?;

        info!(
            variant = %variant,
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            uvs = mesh.uv_count(),
            "Loaded mesh"
        );

        self.loaded = Some(LoadedMesh {
            variant,
            mesh,
            mapper,
            solver,
        });
        self.state = SessionState::Loaded;
        Ok(())
    }

    /// Resolve a batch of `(start_x, start_y, end_x, end_y)` pixel rows.
    ///
    /// Rows with a non-finite coordinate or a pixel off the template image are
    /// dropped. Fails with [`Error::EmptyInput`] when nothing is left.
    pub fn load_points(&mut self, rows: &[[f64; 4]]) -> Result<PointsSummary> {
        if self.state != SessionState::Loaded {
            return Err(Error::state("load points", self.state));
        }
        let loaded = self.loaded_mesh("load points")?;
        let image = &self.options.image_size;

        let mut pairs = Vec::with_capacity(rows.len());
        let mut dropped = 0;
        for (idx, row) in rows.iter().enumerate() {
            if row.iter().any(|c| !c.is_finite()) {
                warn!(row = idx, "Dropping row with a missing coordinate");
                dropped += 1;
                continue;
            }

            let start = PixelPoint::new(row[0], row[1]);
            let end = PixelPoint::new(row[2], row[3]);
            if !(image.contains(&start) && image.contains(&end)) {
                warn!(row = idx, "Dropping row with a pixel outside the image");
                dropped += 1;
                continue;
            }

            let start = loaded.mapper.pixel_vertex(&start, image)?;
            let end = loaded.mapper.pixel_vertex(&end, image)?;
            pairs.push((start, end));
        }

        if pairs.is_empty() {
            return Err(Error::EmptyInput { dropped });
        }

        let summary = PointsSummary {
            retained: pairs.len(),
            dropped,
        };
        debug!(retained = summary.retained, dropped, "Loaded query points");

        self.pairs = pairs;
        self.state = SessionState::PointsSet;
        Ok(summary)
    }

    /// Like [`load_points`](Self::load_points) for rows of unchecked width
    pub fn load_point_rows(&mut self, rows: &[Vec<f64>]) -> Result<PointsSummary> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                <[f64; 4]>::try_from(row.as_slice()).map_err(|_| {
                    Error::Validation(format!(
                        "row {} has {} columns, expected 4",
                        idx,
                        row.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.load_points(&rows)
    }

    /// Geodesic distance for every retained row, in input order
    pub fn compute_distances(&mut self) -> Result<Vec<f64>> {
        self.require_points("compute distances")?;
        let solver = &self.loaded_mesh("compute distances")?.solver;

        let distances = self
            .pairs
            .iter()
            .map(|&(start, end)| {
                let field = solver.compute_distance_field(start)?;
                field.get(end).copied().ok_or_else(|| {
                    Error::Solver(format!(
                        "distance field from vertex {} has {} entries, missing vertex {}",
                        start,
                        field.len(),
                        end
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        debug!(queries = distances.len(), "Computed geodesic distances");
        self.distances = Some(distances.clone());
        self.state = SessionState::DistancesReady;
        Ok(distances)
    }

    /// Surface path for every retained row, labelled `path_0`, `path_1`, ...
    pub fn compute_paths(&mut self) -> Result<BTreeMap<String, Vec<Point3d>>> {
        self.require_points("compute paths")?;
        let solver = &self.loaded_mesh("compute paths")?.solver;

        let mut paths = BTreeMap::new();
        for (idx, &(start, end)) in self.pairs.iter().enumerate() {
            paths.insert(format!("path_{}", idx), solver.find_path(start, end)?);
        }

        debug!(queries = paths.len(), "Computed geodesic paths");
        self.paths = Some(paths.clone());
        self.state = SessionState::PathsReady;
        Ok(paths)
    }

    /// Drop the current batch and its results, keeping the mesh loaded
    pub fn reset(&mut self) {
        self.pairs.clear();
        self.distances = None;
        self.paths = None;
        if self.state != SessionState::Unloaded {
            self.state = SessionState::Loaded;
        }
    }

    /// Reset, load a batch and compute its distances (and paths if asked)
    pub fn analyze(&mut self, rows: &[[f64; 4]], with_paths: bool) -> Result<AnalysisReport> {
        if self.state == SessionState::Unloaded {
            return Err(Error::state("analyze", self.state));
        }
        self.reset();

        let summary = self.load_points(rows)?;
        let distances = self.compute_distances()?;
        let paths = if with_paths {
            Some(self.compute_paths()?)
        } else {
            None
        };

        info!(
            retained = summary.retained,
            dropped = summary.dropped,
            with_paths,
            "Analysis complete"
        );
        Ok(AnalysisReport {
            summary,
            distances,
            paths,
        })
    }

    /// Surface patch enclosed by a border drawn on the template image
    pub fn extract_patch(
        &self,
        border: &[PixelPoint],
        options: RegionOptions,
    ) -> Result<SurfacePatch> {
        let loaded = self.loaded_mesh("extract patch")?;
        RegionExtractor::new(&loaded.mesh, options)?.extract_patch(border, &self.options.image_size)
    }

    fn require_unloaded(&self, operation: &'static str) -> Result<()> {
        if self.state != SessionState::Unloaded {
            return Err(Error::state(operation, self.state));
        }
        Ok(())
    }

    fn require_points(&self, operation: &'static str) -> Result<()> {
        if !self.state.has_points() {
            return Err(Error::state(operation, self.state));
        }
        Ok(())
    }

    fn loaded_mesh(&self, operation: &'static str) -> Result<&LoadedMesh<B::Solver>> {
        self.loaded
            .as_ref()
            .ok_or_else(|| Error::state(operation, self.state))
    }
}
