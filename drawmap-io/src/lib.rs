//! I/O operations for drawmap meshes and annotations
//!
//! This crate provides functionality to read UV-mapped meshes from OBJ or
//! pre-converted text files, store prepared meshes as compressed caches, read
//! batch query and border CSV files, and serve prepared meshes per variant.

pub mod cache;
pub mod csv;
pub mod error;
pub mod obj;
pub mod prepare;
pub mod store;

pub use cache::{read_cache, read_cache_file, write_cache, write_cache_file};
pub use csv::{
    read_border_csv, read_border_csv_file, read_query_csv, read_query_csv_file, Delimiter,
};
pub use error::*;
pub use obj::{
    convert_obj_file, convert_obj_to_text, read_mesh_tables, read_mesh_tables_from_path,
    MeshTables,
};
pub use prepare::{merge_tables, prepare_mesh, prepare_variant};
pub use store::DirectoryStore;

use drawmap_core::{Error, MeshData, Result};
use std::path::Path;

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<MeshData> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("obj") | Some("txt") => read_mesh_tables_from_path(path)?.into_mesh(),
        Some(cache::CACHE_EXTENSION) => read_cache_file(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}
