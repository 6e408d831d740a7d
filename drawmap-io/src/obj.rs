//! OBJ format support
//!
//! Reads the vertex, face and UV tables of a UV-mapped triangle mesh from an
//! OBJ file, or from the trimmed text file produced by [`convert_obj_to_text`].
//! Normals are discarded. The UV->vertex lookup comes from the face corners:
//! a `v/vt` corner links UV `vt` to vertex `v`.

use crate::error::IoError;
use drawmap_core::{Error, MeshData, Point3d, Result, UvMap, UvPoint};
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// OBJ statements kept by [`convert_obj_to_text`]
const KEPT_STATEMENTS: [&str; 4] = ["v", "vt", "vn", "f"];

/// Vertex, face and UV tables of one mesh file
#[derive(Debug, Clone, PartialEq)]
pub struct MeshTables {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<[usize; 3]>,
    pub uv_map: UvMap,
}

impl MeshTables {
    /// Validate the tables and build a [`MeshData`]
    pub fn into_mesh(self) -> Result<MeshData> {
        MeshData::new(self.vertices, self.faces, self.uv_map)
    }
}

/// Parse mesh tables from OBJ or pre-converted text
pub fn read_mesh_tables<R: BufRead>(reader: R) -> Result<MeshTables> {
    let raw = parse_obj(reader).map_err(IoError::from)?;
    tables_from_raw(raw)
}

/// Parse mesh tables from an OBJ or text file on disk
pub fn read_mesh_tables_from_path<P: AsRef<Path>>(path: P) -> Result<MeshTables> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => IoError::Io(e),
    })?;
    read_mesh_tables(BufReader::new(file))
}

fn tables_from_raw(raw: RawObj) -> Result<MeshTables> {
    let vertices: Vec<Point3d> = raw
        .positions
        .iter()
        .map(|&(x, y, z, _)| Point3d::new(x as f64, y as f64, z as f64))
        .collect();
    let uvs: Vec<UvPoint> = raw
        .tex_coords
        .iter()
        .map(|&(u, v, _)| UvPoint::new(u as f64, v as f64))
        .collect();

    let mut faces = Vec::with_capacity(raw.polygons.len());
    let mut lookup: Vec<Option<usize>> = vec![None; uvs.len()];

    for (face_idx, polygon) in raw.polygons.iter().enumerate() {
        let corners: Vec<(usize, usize)> = match polygon {
            Polygon::PT(corners) => corners.clone(),
            Polygon::PTN(corners) => corners.iter().map(|&(v, t, _)| (v, t)).collect(),
            Polygon::P(_) | Polygon::PN(_) => {
                return Err(Error::Validation(format!(
                    "face {} has no texture coordinates",
                    face_idx
                )))
            }
        };
        if corners.len() != 3 {
            return Err(Error::Validation(format!(
                "face {} has {} corners, only triangles are supported",
                face_idx,
                corners.len()
            )));
        }

        for &(vertex, uv) in &corners {
            let slot = lookup.get_mut(uv).ok_or_else(|| {
                Error::Validation(format!(
                    "face {} references UV {} of {}",
                    face_idx,
                    uv,
                    uvs.len()
                ))
            })?;
            match *slot {
                Some(existing) if existing != vertex => {
                    return Err(Error::Validation(format!(
                        "UV {} is used with vertices {} and {}",
                        uv, existing, vertex
                    )))
                }
                _ => *slot = Some(vertex),
            }
        }
        faces.push([corners[0].0, corners[1].0, corners[2].0]);
    }

    let lookup = lookup
        .into_iter()
        .enumerate()
        .map(|(uv, vertex)| {
            vertex.ok_or_else(|| {
                Error::Validation(format!("UV {} is not used by any face", uv))
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    debug!(
        vertices = vertices.len(),
        faces = faces.len(),
        uvs = uvs.len(),
        "Parsed mesh tables"
    );

    Ok(MeshTables {
        vertices,
        faces,
        uv_map: UvMap::new(uvs, lookup),
    })
}

/// Copy the `v`, `vt`, `vn` and `f` statements of an OBJ stream.
///
/// Returns the number of lines written.
pub fn convert_obj_to_text<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<usize> {
    let mut kept = 0;
    for line in reader.lines() {
        let line = line?;
        let statement = line.split_whitespace().next();
        if statement.is_some_and(|s| KEPT_STATEMENTS.contains(&s)) {
            writeln!(writer, "{}", line.trim())?;
            kept += 1;
        }
    }
    writer.flush()?;
    Ok(kept)
}

/// Convert an OBJ file into a trimmed text file
pub fn convert_obj_file<P: AsRef<Path>, Q: AsRef<Path>>(
    obj_path: P,
    text_path: Q,
) -> Result<usize> {
    let input = BufReader::new(File::open(obj_path)?);
    let output = BufWriter::new(File::create(text_path)?);
    convert_obj_to_text(input, output)
}
