//! Edge-graph geodesics
//!
//! A reference [`GeodesicBackend`] that runs Dijkstra's algorithm over the
//! mesh edge graph, weighting each edge by its Euclidean length. Distances are
//! exact on the edge graph and approximate true surface distances from above;
//! paths run along mesh edges, so they are feasible but not the shortest path
//! across faces.
//!
//! Production deployments plug a heat-method solver into the same
//! [`GeodesicBackend`] seam. Edge-graph distances are upper bounds on the
//! heat-method values for the same vertex pair, so results from this backend
//! read high on coarse meshes.

use drawmap_core::{Error, GeodesicBackend, GeodesicSolver, MeshData, Point3d, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Builds [`EdgeGraphSolver`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeGraphBackend;

impl GeodesicBackend for EdgeGraphBackend {
    type Solver = EdgeGraphSolver;

    fn build(&self, mesh: &MeshData) -> Result<EdgeGraphSolver> {
        Ok(EdgeGraphSolver::new(mesh.vertices(), mesh.faces()))
    }
}

/// Dijkstra solver bound to one mesh
#[derive(Debug, Clone)]
pub struct EdgeGraphSolver {
    vertices: Vec<Point3d>,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl EdgeGraphSolver {
    pub fn new(vertices: &[Point3d], faces: &[[usize; 3]]) -> Self {
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); vertices.len()];
        for face in faces {
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                let length = (vertices[b] - vertices[a]).norm();
                // Interior edges appear in two faces
                if !adjacency[a].iter().any(|&(n, _)| n == b) {
                    adjacency[a].push((b, length));
                    adjacency[b].push((a, length));
                }
            }
        }
        Self {
            vertices: vertices.to_vec(),
            adjacency,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn check_vertex(&self, v: usize) -> Result<()> {
        if v >= self.vertices.len() {
            return Err(Error::Solver(format!(
                "vertex {} is outside 0..{}",
                v,
                self.vertices.len()
            )));
        }
        Ok(())
    }

    /// Run Dijkstra from `source`, stopping early once `target` is settled
    fn dijkstra(&self, source: usize, target: Option<usize>) -> (Vec<f64>, Vec<Option<usize>>) {
        let n = self.vertices.len();
        let mut distances = vec![f64::INFINITY; n];
        let mut predecessors = vec![None; n];
        let mut heap = BinaryHeap::new();

        distances[source] = 0.0;
        heap.push(DijkstraEntry::new(source, 0.0));

        while let Some(entry) = heap.pop() {
            if entry.distance > distances[entry.vertex] {
                continue;
            }
            if Some(entry.vertex) == target {
                break;
            }

            for &(neighbor, length) in &self.adjacency[entry.vertex] {
                let candidate = entry.distance + length;
                if candidate < distances[neighbor] {
                    distances[neighbor] = candidate;
                    predecessors[neighbor] = Some(entry.vertex);
                    heap.push(DijkstraEntry::new(neighbor, candidate));
                }
            }
        }

        (distances, predecessors)
    }
}

impl GeodesicSolver for EdgeGraphSolver {
    fn compute_distance_field(&self, source: usize) -> Result<Vec<f64>> {
        self.check_vertex(source)?;
        Ok(self.dijkstra(source, None).0)
    }

    fn find_path(&self, source: usize, target: usize) -> Result<Vec<Point3d>> {
        self.check_vertex(source)?;
        self.check_vertex(target)?;

        let (distances, predecessors) = self.dijkstra(source, Some(target));
        if !distances[target].is_finite() {
            return Err(Error::Solver(format!(
                "vertex {} is not reachable from vertex {}",
                target, source
            )));
        }

        let mut path = vec![target];
        let mut current = target;
        while let Some(pred) = predecessors[current] {
            path.push(pred);
            current = pred;
        }
        path.reverse();

        Ok(path.into_iter().map(|v| self.vertices[v]).collect())
    }
}

/// Entry in Dijkstra's priority queue
#[derive(Debug, Clone)]
struct DijkstraEntry {
    vertex: usize,
    distance: f64,
}

impl DijkstraEntry {
    fn new(vertex: usize, distance: f64) -> Self {
        Self { vertex, distance }
    }
}

impl PartialEq for DijkstraEntry {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.vertex == other.vertex
    }
}

impl Eq for DijkstraEntry {}

impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; lower vertex ids first on equal distance
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use drawmap_core::{UvMap, UvPoint};

    /// Unit quad split along the 0-2 diagonal, plus an isolated vertex 4
    fn quad_mesh() -> MeshData {
        let vertices = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
            Point3d::new(5.0, 5.0, 5.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        let uv_map = UvMap::new(vec![UvPoint::new(0.0, 0.0)], vec![0]);
        MeshData::new(vertices, faces, uv_map).unwrap()
    }

    #[test]
    fn test_distance_field() {
        let solver = EdgeGraphBackend.build(&quad_mesh()).unwrap();
        let field = solver.compute_distance_field(0).unwrap();

        assert_eq!(field.len(), 5);
        assert_relative_eq!(field[0], 0.0);
        assert_relative_eq!(field[1], 1.0);
        assert_relative_eq!(field[2], 2.0_f64.sqrt());
        assert_relative_eq!(field[3], 1.0);
        assert!(field[4].is_infinite());
    }

    #[test]
    fn test_path_follows_edges() {
        let solver = EdgeGraphBackend.build(&quad_mesh()).unwrap();
        let path = solver.find_path(1, 3).unwrap();

        assert_eq!(path.first(), Some(&Point3d::new(1.0, 0.0, 0.0)));
        assert_eq!(path.last(), Some(&Point3d::new(0.0, 1.0, 0.0)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_path_to_self() {
        let solver = EdgeGraphBackend.build(&quad_mesh()).unwrap();
        assert_eq!(solver.find_path(2, 2).unwrap(), vec![Point3d::new(1.0, 1.0, 0.0)]);
    }

    #[test]
    fn test_unreachable_and_invalid_vertices() {
        let solver = EdgeGraphBackend.build(&quad_mesh()).unwrap();
        assert!(matches!(solver.find_path(0, 4), Err(Error::Solver(_))));
        assert!(matches!(solver.compute_distance_field(9), Err(Error::Solver(_))));
    }

    #[test]
    fn test_deterministic() {
        let solver = EdgeGraphBackend.build(&quad_mesh()).unwrap();
        assert_eq!(solver.find_path(1, 3).unwrap(), solver.find_path(1, 3).unwrap());
        assert_eq!(
            solver.compute_distance_field(3).unwrap(),
            solver.compute_distance_field(3).unwrap()
        );
    }
}
