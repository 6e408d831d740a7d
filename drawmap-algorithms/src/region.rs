//! Surface patch extraction from a drawn border
//!
//! A location drawing's border pixels are matched to UV points, cleaned into a
//! closed polygon in UV space, and every UV point inside or on that polygon is
//! resolved to its mesh vertex. Several UV ids may resolve to one vertex along
//! seams; the patch keeps each vertex once.

use crate::mapping::CoordinateMapper;
use crate::nearest_neighbor::KdUvIndex;
use drawmap_core::{
    triangle_area, ContainmentStrategy, Error, ImageSize, MeshData, PixelPoint, Point3d, Result,
    RegionOptions, UvPoint, UvSearch,
};
use itertools::Itertools;
use rayon::prelude::*;
use rstar::{primitives::GeomWithData, RTree, AABB};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Tolerance for treating a UV point as lying on a border edge
const EDGE_EPSILON: f64 = 1e-12;

type IndexedUv = GeomWithData<[f64; 2], usize>;

/// The 3D vertices covered by a drawn location
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurfacePatch {
    /// Distinct mesh vertex ids, ascending
    pub vertex_ids: Vec<usize>,
    /// Positions of `vertex_ids`, in the same order
    pub points: Vec<Point3d>,
}

impl SurfacePatch {
    pub fn len(&self) -> usize {
        self.vertex_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty()
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.vertex_ids.binary_search(&vertex).is_ok()
    }

    /// Mesh faces whose three vertices all belong to the patch
    pub fn faces(&self, mesh: &MeshData) -> Vec<[usize; 3]> {
        mesh.faces()
            .iter()
            .filter(|face| face.iter().all(|&v| self.contains(v)))
            .copied()
            .collect()
    }

    /// Surface area of the patch faces
    pub fn area(&self, mesh: &MeshData) -> f64 {
        let vertices = mesh.vertices();
        self.faces(mesh)
            .iter()
            .map(|&[a, b, c]| triangle_area(&vertices[a], &vertices[b], &vertices[c]))
            .sum()
    }
}

/// Map every border pixel to its nearest UV id, in border order
pub fn find_border_uvs<S: UvSearch>(
    mapper: &CoordinateMapper<S>,
    border: &[PixelPoint],
    image: &ImageSize,
) -> Result<Vec<usize>> {
    border
        .iter()
        .map(|pixel| mapper.pixel_to_uv(pixel, image))
        .collect()
}

/// Remove consecutive repeats from a traced border, including the closing
/// repeat of the first id, leaving a polygon without repeated neighbors.
pub fn clean_border(border_uvs: &[usize]) -> Result<Vec<usize>> {
    let mut cleaned: Vec<usize> = border_uvs.iter().copied().dedup().collect();
    while cleaned.len() > 1 && cleaned.first() == cleaned.last() {
        cleaned.pop();
    }

    let distinct = cleaned.iter().collect::<HashSet<_>>().len();
    if distinct < 3 {
        return Err(Error::DegenerateBoundary { distinct });
    }
    Ok(cleaned)
}

/// UV ids strictly inside or on the polygon traced by `border`, ascending.
/// Every border id is included.
pub fn find_enclosed_uvs(
    uvs: &[UvPoint],
    border: &[usize],
    strategy: ContainmentStrategy,
) -> Result<Vec<usize>> {
    match strategy {
        ContainmentStrategy::Exhaustive => enclosed_among(uvs, border, 0..uvs.len()),
        ContainmentStrategy::BoundingBox => {
            let tree = build_uv_tree(uvs);
            enclosed_in_tree(uvs, &tree, border)
        }
    }
}

/// Map enclosed UV ids to their distinct vertices and gather positions
pub fn resolve_to_vertices(
    uv_ids: &[usize],
    lookup: &[usize],
    vertices: &[Point3d],
) -> Result<SurfacePatch> {
    let mut vertex_ids = BTreeSet::new();
    for &uv_id in uv_ids {
        let vertex = *lookup.get(uv_id).ok_or_else(|| {
            Error::Validation(format!(
                "UV id {} has no lookup entry ({} entries)",
                uv_id,
                lookup.len()
            ))
        })?;
        if vertex >= vertices.len() {
            return Err(Error::Validation(format!(
                "UV id {} maps to vertex {} outside 0..{}",
                uv_id,
                vertex,
                vertices.len()
            )));
        }
        vertex_ids.insert(vertex);
    }

    let vertex_ids: Vec<usize> = vertex_ids.into_iter().collect();
    let points = vertex_ids.iter().map(|&v| vertices[v]).collect();
    Ok(SurfacePatch { vertex_ids, points })
}

/// Extract the surface patch enclosed by a drawn border
pub fn extract_patch(
    border: &[PixelPoint],
    image: &ImageSize,
    mesh: &MeshData,
    options: &RegionOptions,
) -> Result<SurfacePatch> {
    RegionExtractor::new(mesh, *options)?.extract_patch(border, image)
}

/// Reusable patch extractor for one mesh; builds its spatial indices once
pub struct RegionExtractor<'a> {
    mesh: &'a MeshData,
    mapper: CoordinateMapper<KdUvIndex>,
    tree: Option<RTree<IndexedUv>>,
    options: RegionOptions,
}

impl<'a> RegionExtractor<'a> {
    pub fn new(mesh: &'a MeshData, options: RegionOptions) -> Result<Self> {
        let mapper = CoordinateMapper::new(mesh.uv_map(), options.mapping)?;
        let tree = match options.containment {
            ContainmentStrategy::BoundingBox => Some(build_uv_tree(mesh.uvs())),
            ContainmentStrategy::Exhaustive => None,
        };
        Ok(Self {
            mesh,
            mapper,
            tree,
            options,
        })
    }

    pub fn options(&self) -> &RegionOptions {
        &self.options
    }

    /// Cleaned border UV ids for a drawn border
    pub fn border_uvs(&self, border: &[PixelPoint], image: &ImageSize) -> Result<Vec<usize>> {
        clean_border(&find_border_uvs(&self.mapper, border, image)?)
    }

    /// UV ids enclosed by a drawn border
    pub fn enclosed_uvs(&self, border: &[PixelPoint], image: &ImageSize) -> Result<Vec<usize>> {
        let cleaned = self.border_uvs(border, image)?;
        match &self.tree {
            Some(tree) => enclosed_in_tree(self.mesh.uvs(), tree, &cleaned),
            None => enclosed_among(self.mesh.uvs(), &cleaned, 0..self.mesh.uv_count()),
        }
    }

    /// The surface patch enclosed by a drawn border
    pub fn extract_patch(&self, border: &[PixelPoint], image: &ImageSize) -> Result<SurfacePatch> {
        let enclosed = self.enclosed_uvs(border, image)?;
        let patch = resolve_to_vertices(&enclosed, self.mesh.lookup(), self.mesh.vertices())?;
        debug!(
            border_pixels = border.len(),
            enclosed_uvs = enclosed.len(),
            vertices = patch.len(),
            "Extracted surface patch"
        );
        Ok(patch)
    }
}

fn build_uv_tree(uvs: &[UvPoint]) -> RTree<IndexedUv> {
    RTree::bulk_load(
        uvs.iter()
            .enumerate()
            .map(|(idx, uv)| GeomWithData::new([uv.x, uv.y], idx))
            .collect(),
    )
}

fn border_polygon(uvs: &[UvPoint], border: &[usize]) -> Result<Vec<UvPoint>> {
    let distinct = border.iter().collect::<HashSet<_>>().len();
    if distinct < 3 {
        return Err(Error::DegenerateBoundary { distinct });
    }
    border
        .iter()
        .map(|&id| {
            uvs.get(id).copied().ok_or_else(|| {
                Error::Validation(format!("border UV id {} is outside 0..{}", id, uvs.len()))
            })
        })
        .collect()
}

fn enclosed_in_tree(
    uvs: &[UvPoint],
    tree: &RTree<IndexedUv>,
    border: &[usize],
) -> Result<Vec<usize>> {
    let polygon = border_polygon(uvs, border)?;
    let (min, max) = polygon.iter().fold(
        ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]),
        |(min, max), p| {
            (
                [min[0].min(p.x), min[1].min(p.y)],
                [max[0].max(p.x), max[1].max(p.y)],
            )
        },
    );
    let envelope = AABB::from_corners(
        [min[0] - EDGE_EPSILON, min[1] - EDGE_EPSILON],
        [max[0] + EDGE_EPSILON, max[1] + EDGE_EPSILON],
    );
    let candidates: Vec<usize> = tree
        .locate_in_envelope(&envelope)
        .map(|entry| entry.data)
        .collect();
    enclosed_among(uvs, border, candidates)
}

fn enclosed_among<I>(uvs: &[UvPoint], border: &[usize], candidates: I) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = usize>,
{
    let polygon = border_polygon(uvs, border)?;
    let candidates: Vec<usize> = candidates.into_iter().collect();

    let mut enclosed: BTreeSet<usize> = candidates
        .par_iter()
        .copied()
        .filter(|&id| point_in_polygon(&uvs[id], &polygon))
        .collect();
    enclosed.extend(border.iter().copied());

    Ok(enclosed.into_iter().collect())
}

/// Even-odd containment; points on an edge count as inside
fn point_in_polygon(p: &UvPoint, polygon: &[UvPoint]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (&polygon[i], &polygon[j]);
        if on_segment(p, a, b) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(p: &UvPoint, a: &UvPoint, b: &UvPoint) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return ap.norm_squared() <= EDGE_EPSILON * EDGE_EPSILON;
    }
    let cross = ab.x * ap.y - ab.y * ap.x;
    if cross.abs() > EDGE_EPSILON * len_sq.sqrt() {
        return false;
    }
    let t = ap.dot(&ab);
    t >= -EDGE_EPSILON && t <= len_sq + EDGE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawmap_core::UvMap;

    /// 5x5 grid of UV points at multiples of 0.25, one vertex per UV point
    fn grid_mesh() -> MeshData {
        let mut vertices = Vec::new();
        let mut uvs = Vec::new();
        for j in 0..5 {
            for i in 0..5 {
                let (u, v) = (i as f64 * 0.25, j as f64 * 0.25);
                vertices.push(Point3d::new(u, v, 0.0));
                uvs.push(UvPoint::new(u, v));
            }
        }
        let mut faces = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                let a = j * 5 + i;
                faces.push([a, a + 1, a + 6]);
                faces.push([a, a + 6, a + 5]);
            }
        }
        let lookup = (0..uvs.len()).collect();
        MeshData::new(vertices, faces, UvMap::new(uvs, lookup)).unwrap()
    }

    fn square_border(from: f64, to: f64, image: f64) -> Vec<PixelPoint> {
        // Trace a square in UV space as image pixels, top-left image origin
        let px = |u: f64| u * image;
        let py = |v: f64| (1.0 - v) * image;
        let steps = 20;
        let mut border = Vec::new();
        let corners = [(from, from), (to, from), (to, to), (from, to), (from, from)];
        for pair in corners.windows(2) {
            let ((u0, v0), (u1, v1)) = (pair[0], pair[1]);
            for s in 0..steps {
                let t = s as f64 / steps as f64;
                border.push(PixelPoint::new(px(u0 + (u1 - u0) * t), py(v0 + (v1 - v0) * t)));
            }
        }
        border.push(PixelPoint::new(px(from), py(from)));
        border
    }

    #[test]
    fn test_clean_border_removes_consecutive_repeats() {
        let cleaned = clean_border(&[4, 4, 5, 5, 5, 9, 4, 4]).unwrap();
        assert_eq!(cleaned, vec![4, 5, 9]);
    }

    #[test]
    fn test_clean_border_keeps_non_consecutive_revisits() {
        let cleaned = clean_border(&[1, 2, 3, 2, 4]).unwrap();
        assert_eq!(cleaned, vec![1, 2, 3, 2, 4]);
    }

    #[test]
    fn test_clean_border_is_idempotent() {
        let raw = [7, 7, 1, 1, 2, 3, 3, 7, 7, 7];
        let once = clean_border(&raw).unwrap();
        let twice = clean_border(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_border_degenerate() {
        assert!(matches!(
            clean_border(&[1, 1, 2, 2, 1]),
            Err(Error::DegenerateBoundary { distinct: 2 })
        ));
        assert!(matches!(
            clean_border(&[]),
            Err(Error::DegenerateBoundary { distinct: 0 })
        ));
    }

    #[test]
    fn test_point_in_polygon_edges_and_inside() {
        let square = vec![
            UvPoint::new(0.0, 0.0),
            UvPoint::new(1.0, 0.0),
            UvPoint::new(1.0, 1.0),
            UvPoint::new(0.0, 1.0),
        ];
        assert!(point_in_polygon(&UvPoint::new(0.5, 0.5), &square));
        assert!(point_in_polygon(&UvPoint::new(0.5, 0.0), &square));
        assert!(point_in_polygon(&UvPoint::new(1.0, 1.0), &square));
        assert!(!point_in_polygon(&UvPoint::new(1.5, 0.5), &square));
        assert!(!point_in_polygon(&UvPoint::new(0.5, -0.1), &square));
    }

    #[test]
    fn test_enclosed_uvs_include_border() {
        let mesh = grid_mesh();
        // Triangle over grid ids 0, 4 and 24
        let border = vec![0, 4, 24];
        for strategy in [ContainmentStrategy::Exhaustive, ContainmentStrategy::BoundingBox] {
            let enclosed = find_enclosed_uvs(mesh.uvs(), &border, strategy).unwrap();
            for id in &border {
                assert!(enclosed.contains(id));
            }
            // Lower-right triangle of the grid (u >= v) holds 15 points
            assert_eq!(enclosed.len(), 15);
            assert!(enclosed.iter().all(|&id| mesh.uvs()[id].x >= mesh.uvs()[id].y));
        }
    }

    #[test]
    fn test_enclosed_uvs_rejects_bad_border() {
        let mesh = grid_mesh();
        assert!(matches!(
            find_enclosed_uvs(mesh.uvs(), &[0, 1, 99], ContainmentStrategy::Exhaustive),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            find_enclosed_uvs(mesh.uvs(), &[0, 1], ContainmentStrategy::BoundingBox),
            Err(Error::DegenerateBoundary { .. })
        ));
    }

    #[test]
    fn test_resolve_deduplicates_seam_vertices() {
        let vertices = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ];
        let lookup = vec![2, 0, 2, 1, 0];
        let patch = resolve_to_vertices(&[0, 1, 2, 4], &lookup, &vertices).unwrap();
        assert_eq!(patch.vertex_ids, vec![0, 2]);
        assert_eq!(patch.points, vec![vertices[0], vertices[2]]);

        assert!(matches!(
            resolve_to_vertices(&[7], &lookup, &vertices),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_extract_patch_quadrant() {
        let mesh = grid_mesh();
        let image = ImageSize::new(400.0, 400.0).unwrap();
        let border = square_border(0.0, 0.5, 400.0);

        for strategy in [ContainmentStrategy::Exhaustive, ContainmentStrategy::BoundingBox] {
            let options = RegionOptions::default().with_containment(strategy);
            let patch = extract_patch(&border, &image, &mesh, &options).unwrap();

            assert_eq!(patch.len(), 9);
            for p in &patch.points {
                assert!(p.x <= 0.5 && p.y <= 0.5, "{:?} is outside the quadrant", p);
            }
            // Four grid cells of 0.25 x 0.25
            assert!((patch.area(&mesh) - 0.25).abs() < 1e-12);
            assert_eq!(patch.faces(&mesh).len(), 8);
        }
    }

    #[test]
    fn test_extract_patch_rejects_off_image_border() {
        let mesh = grid_mesh();
        let image = ImageSize::new(400.0, 400.0).unwrap();
        let mut border = square_border(0.0, 0.5, 400.0);
        border.push(PixelPoint::new(-5.0, 10.0));
        let result = extract_patch(&border, &image, &mesh, &RegionOptions::default());
        assert!(matches!(result, Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_extract_patch_degenerate_scribble() {
        let mesh = grid_mesh();
        let image = ImageSize::new(400.0, 400.0).unwrap();
        let border = vec![
            PixelPoint::new(100.0, 100.0),
            PixelPoint::new(101.0, 100.0),
            PixelPoint::new(100.0, 101.0),
        ];
        let result = extract_patch(&border, &image, &mesh, &RegionOptions::default());
        assert!(matches!(result, Err(Error::DegenerateBoundary { distinct: 1 })));
    }
}
