//! Compressed binary mesh cache
//!
//! Parsing a large OBJ on every session is slow, so prepared meshes are stored
//! as a gzip stream of little-endian arrays:
//!
//! ```text
//! magic    [u8; 4]  "DMC\0"
//! version  u32
//! counts   u64 x 4  vertices, faces, uvs, lookup entries
//! vertices f64 x 3 per vertex
//! faces    u32 x 3 per face
//! uvs      f64 x 2 per UV point
//! lookup   u32 per UV point
//! ```

use crate::error::IoError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use drawmap_core::{MeshData, Point3d, Result, UvMap, UvPoint};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Leading bytes of every cache file
pub const CACHE_MAGIC: [u8; 4] = *b"DMC\0";

/// Current layout version
pub const CACHE_VERSION: u32 = 1;

/// File extension used for cache files
pub const CACHE_EXTENSION: &str = "dmc";

// Upper bound on speculative allocation from header counts
const MAX_PREALLOCATION: usize = 1 << 20;

/// Write a mesh as a compressed cache stream
pub fn write_cache<W: Write>(mesh: &MeshData, writer: W) -> Result<()> {
    let mut encoder = GzEncoder::new(writer, Compression::default());
    write_tables(mesh, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}

/// Read a mesh from a compressed cache stream and validate it
pub fn read_cache<R: Read>(reader: R) -> Result<MeshData> {
    let mut decoder = GzDecoder::new(reader);
    let (vertices, faces, uv_map) = read_tables(&mut decoder)?;
    MeshData::new(vertices, faces, uv_map)
}

/// Write a mesh cache file
pub fn write_cache_file<P: AsRef<Path>>(mesh: &MeshData, path: P) -> Result<()> {
    let file = File::create(path)?;
    write_cache(mesh, BufWriter::new(file))
}

/// Read a mesh cache file
pub fn read_cache_file<P: AsRef<Path>>(path: P) -> Result<MeshData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => IoError::Io(e),
    })?;
    let mesh = read_cache(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        uvs = mesh.uv_count(),
        "Read mesh cache"
    );
    Ok(mesh)
}

fn write_tables<W: Write>(mesh: &MeshData, w: &mut W) -> std::result::Result<(), IoError> {
    w.write_all(&CACHE_MAGIC)?;
    w.write_u32::<LittleEndian>(CACHE_VERSION)?;
    for count in [
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.uv_count(),
        mesh.lookup().len(),
    ] {
        w.write_u64::<LittleEndian>(count as u64)?;
    }

    for v in mesh.vertices() {
        w.write_f64::<LittleEndian>(v.x)?;
        w.write_f64::<LittleEndian>(v.y)?;
        w.write_f64::<LittleEndian>(v.z)?;
    }
    for face in mesh.faces() {
        for &idx in face {
            w.write_u32::<LittleEndian>(index_to_u32(idx)?)?;
        }
    }
    for uv in mesh.uvs() {
        w.write_f64::<LittleEndian>(uv.x)?;
        w.write_f64::<LittleEndian>(uv.y)?;
    }
    for &vertex in mesh.lookup() {
        w.write_u32::<LittleEndian>(index_to_u32(vertex)?)?;
    }
    Ok(())
}

type Tables = (Vec<Point3d>, Vec<[usize; 3]>, UvMap);

fn read_tables<R: Read>(r: &mut R) -> std::result::Result<Tables, IoError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != CACHE_MAGIC {
        return Err(IoError::InvalidFormat {
            format: "not a drawmap mesh cache".to_string(),
        });
    }
    let version = r.read_u32::<LittleEndian>()?;
    if version != CACHE_VERSION {
        return Err(IoError::cache(format!(
            "unsupported cache version {} (expected {})",
            version, CACHE_VERSION
        )));
    }

    let mut counts = [0usize; 4];
    for count in counts.iter_mut() {
        *count = usize::try_from(r.read_u64::<LittleEndian>()?)
            .map_err(|_| IoError::cache("table size does not fit in memory"))?;
    }
    let [vertex_count, face_count, uv_count, lookup_count] = counts;

    let mut vertices = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATION));
    for _ in 0..vertex_count {
        let x = r.read_f64::<LittleEndian>()?;
        let y = r.read_f64::<LittleEndian>()?;
        let z = r.read_f64::<LittleEndian>()?;
        vertices.push(Point3d::new(x, y, z));
    }

    let mut faces = Vec::with_capacity(face_count.min(MAX_PREALLOCATION));
    for _ in 0..face_count {
        let mut face = [0usize; 3];
        for idx in face.iter_mut() {
            *idx = r.read_u32::<LittleEndian>()? as usize;
        }
        faces.push(face);
    }

    let mut uvs = Vec::with_capacity(uv_count.min(MAX_PREALLOCATION));
    for _ in 0..uv_count {
        let u = r.read_f64::<LittleEndian>()?;
        let v = r.read_f64::<LittleEndian>()?;
        uvs.push(UvPoint::new(u, v));
    }

    let mut lookup = Vec::with_capacity(lookup_count.min(MAX_PREALLOCATION));
    for _ in 0..lookup_count {
        lookup.push(r.read_u32::<LittleEndian>()? as usize);
    }

    Ok((vertices, faces, UvMap::new(uvs, lookup)))
}

fn index_to_u32(idx: usize) -> std::result::Result<u32, IoError> {
    u32::try_from(idx).map_err(|_| IoError::cache(format!("index {} does not fit in u32", idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawmap_core::Error;
    use tempfile::NamedTempFile;

    fn seam_mesh() -> MeshData {
        let vertices = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.5, 0.0, -0.25),
            Point3d::new(1.0, 1.0, 0.125),
            Point3d::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![
            UvPoint::new(0.1, 0.1),
            UvPoint::new(0.9, 0.1),
            UvPoint::new(0.9, 0.9),
            UvPoint::new(0.1, 0.9),
            UvPoint::new(0.123456789012345, 0.5),
        ];
        MeshData::new(
            vertices,
            vec![[0, 1, 2], [0, 2, 3]],
            UvMap::new(uvs, vec![0, 1, 2, 3, 2]),
        )
        .unwrap()
    }

    #[test]
    fn test_cache_file_preserves_tables_exactly() {
        let mesh = seam_mesh();
        let file = NamedTempFile::new().unwrap();

        write_cache_file(&mesh, file.path()).unwrap();
        let loaded = read_cache_file(file.path()).unwrap();

        assert_eq!(loaded, mesh);
    }

    #[test]
    fn test_cache_is_compressed() {
        let mut buffer = Vec::new();
        write_cache(&seam_mesh(), &mut buffer).unwrap();
        // gzip member header
        assert_eq!(&buffer[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_rejects_foreign_data() {
        let mut buffer = Vec::new();
        {
            let mut encoder = GzEncoder::new(&mut buffer, Compression::default());
            encoder.write_all(b"PLY\0\x01\x00\x00\x00").unwrap();
            encoder.finish().unwrap();
        }
        assert!(matches!(
            read_cache(buffer.as_slice()),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut buffer = Vec::new();
        {
            let mut encoder = GzEncoder::new(&mut buffer, Compression::default());
            encoder.write_all(&CACHE_MAGIC).unwrap();
            encoder.write_u32::<LittleEndian>(CACHE_VERSION + 1).unwrap();
            encoder.finish().unwrap();
        }
        assert!(matches!(read_cache(buffer.as_slice()), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_truncated_cache_is_an_error() {
        let mut buffer = Vec::new();
        write_cache(&seam_mesh(), &mut buffer).unwrap();
        buffer.truncate(buffer.len() / 2);
        assert!(read_cache(buffer.as_slice()).is_err());
    }
}
