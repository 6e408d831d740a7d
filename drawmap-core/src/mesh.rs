//! Mesh data store: vertices, faces and the UV parameterization of one mesh variant

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A UV table paired with its UV->vertex lookup table.
///
/// Row `i` of `uvs` is UV id `i`; `lookup[i]` is the mesh vertex that UV point
/// belongs to. Several UV ids may share one vertex id (seam vertices).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UvMap {
    pub uvs: Vec<UvPoint>,
    pub lookup: Vec<usize>,
}

impl UvMap {
    /// Create a UV map from its tables
    pub fn new(uvs: Vec<UvPoint>, lookup: Vec<usize>) -> Self {
        Self { uvs, lookup }
    }

    /// Get the number of UV points
    pub fn len(&self) -> usize {
        self.uvs.len()
    }

    /// Check if the map has no UV points
    pub fn is_empty(&self) -> bool {
        self.uvs.is_empty()
    }

    /// Check that every UV id has exactly one lookup entry
    pub fn validate(&self) -> Result<()> {
        if self.uvs.len() != self.lookup.len() {
            return Err(Error::Validation(format!(
                "UV table has {} rows but lookup table has {}",
                self.uvs.len(),
                self.lookup.len()
            )));
        }
        Ok(())
    }
}

/// Immutable in-memory representation of one anatomical mesh variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshData {
    vertices: Vec<Point3d>,
    faces: Vec<[usize; 3]>,
    uv_map: UvMap,
}

impl MeshData {
    /// Create a mesh after checking that faces and lookup entries reference valid vertices
    pub fn new(vertices: Vec<Point3d>, faces: Vec<[usize; 3]>, uv_map: UvMap) -> Result<Self> {
        uv_map.validate()?;

        let n = vertices.len();
        if let Some((face_idx, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&v| v >= n))
        {
            return Err(Error::Validation(format!(
                "face {} {:?} references a vertex outside 0..{}",
                face_idx, face, n
            )));
        }

        if let Some((uv_id, vertex)) = uv_map
            .lookup
            .iter()
            .enumerate()
            .find(|&(_, &vertex)| vertex >= n)
        {
            return Err(Error::Validation(format!(
                "UV {} maps to vertex {} but the mesh has {} vertices",
                uv_id, vertex, n
            )));
        }

        Ok(Self {
            vertices,
            faces,
            uv_map,
        })
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of UV points
    pub fn uv_count(&self) -> usize {
        self.uv_map.len()
    }

    pub fn vertices(&self) -> &[Point3d] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn uvs(&self) -> &[UvPoint] {
        &self.uv_map.uvs
    }

    pub fn lookup(&self) -> &[usize] {
        &self.uv_map.lookup
    }

    pub fn uv_map(&self) -> &UvMap {
        &self.uv_map
    }

    /// Position of a vertex, if the id is valid
    pub fn vertex(&self, id: usize) -> Option<&Point3d> {
        self.vertices.get(id)
    }

    /// Vertex id a UV point belongs to, if the UV id is valid
    pub fn vertex_for_uv(&self, uv_id: usize) -> Option<usize> {
        self.uv_map.lookup.get(uv_id).copied()
    }

    /// Area of one face
    pub fn face_area(&self, face_idx: usize) -> Option<f64> {
        let [a, b, c] = *self.faces.get(face_idx)?;
        Some(triangle_area(
            &self.vertices[a],
            &self.vertices[b],
            &self.vertices[c],
        ))
    }

    /// Split the mesh back into its tables
    pub fn into_parts(self) -> (Vec<Point3d>, Vec<[usize; 3]>, UvMap) {
        (self.vertices, self.faces, self.uv_map)
    }
}

/// Area of the triangle spanned by three points
pub fn triangle_area(a: &Point3d, b: &Point3d, c: &Point3d) -> f64 {
    (b - a).cross(&(c - a)).norm() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> (Vec<Point3d>, Vec<[usize; 3]>, UvMap) {
        let vertices = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        let uv_map = UvMap::new(
            vec![
                UvPoint::new(0.0, 0.0),
                UvPoint::new(1.0, 0.0),
                UvPoint::new(1.0, 1.0),
                UvPoint::new(0.0, 1.0),
            ],
            vec![0, 1, 2, 3],
        );
        (vertices, faces, uv_map)
    }

    #[test]
    fn test_mesh_accessors() {
        let (vertices, faces, uv_map) = quad();
        let mesh = MeshData::new(vertices, faces, uv_map).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.uv_count(), 4);
        assert_eq!(mesh.vertex_for_uv(2), Some(2));
        assert_eq!(mesh.vertex_for_uv(4), None);
        assert_relative_eq!(mesh.face_area(0).unwrap(), 0.5);
    }

    #[test]
    fn test_mesh_rejects_bad_face() {
        let (vertices, _, uv_map) = quad();
        let result = MeshData::new(vertices, vec![[0, 1, 4]], uv_map);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_mesh_rejects_bad_lookup() {
        let (vertices, faces, mut uv_map) = quad();
        uv_map.lookup[3] = 9;
        assert!(matches!(
            MeshData::new(vertices, faces, uv_map),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_uv_map_length_mismatch() {
        let uv_map = UvMap::new(vec![UvPoint::new(0.2, 0.2)], vec![0, 1]);
        assert!(matches!(uv_map.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_seam_vertices_share_an_id() {
        let (vertices, faces, mut uv_map) = quad();
        uv_map.uvs.push(UvPoint::new(0.9, 0.1));
        uv_map.lookup.push(1);
        let mesh = MeshData::new(vertices, faces, uv_map).unwrap();
        assert_eq!(mesh.vertex_for_uv(1), mesh.vertex_for_uv(4));
    }
}
