//! Offline mesh preparation
//!
//! Parses a base mesh and any secondary UV layouts of the same mesh, merges
//! their UV tables, and writes the result as a cache file for a
//! [`DirectoryStore`](crate::DirectoryStore).

use crate::cache::write_cache_file;
use crate::obj::{read_mesh_tables_from_path, MeshTables};
use crate::store::DirectoryStore;
use drawmap_algorithms::combine;
use drawmap_core::{Error, MeshData, MeshVariant, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Build one mesh from a base file and secondary UV layouts of the same mesh
pub fn prepare_mesh<P: AsRef<Path>>(base: P, additions: &[PathBuf]) -> Result<MeshData> {
    let base = read_mesh_tables_from_path(base)?;
    let additions = additions
        .iter()
        .map(read_mesh_tables_from_path)
        .collect::<Result<Vec<_>>>()?;
    merge_tables(base, additions)
}

/// Merge the UV tables of secondary layouts into a base mesh
pub fn merge_tables(base: MeshTables, additions: Vec<MeshTables>) -> Result<MeshData> {
    for (idx, addition) in additions.iter().enumerate() {
        if addition.vertices.len() != base.vertices.len() {
            return Err(Error::Validation(format!(
                "addition {} has {} vertices but the base mesh has {}",
                idx,
                addition.vertices.len(),
                base.vertices.len()
            )));
        }
    }

    let addition_maps: Vec<_> = additions.into_iter().map(|t| t.uv_map).collect();
    let uv_map = combine(&base.uv_map, &addition_maps)?;
    MeshData::new(base.vertices, base.faces, uv_map)
}

/// Prepare a variant and write it where `store` will look for it.
///
/// Returns the path of the written cache file.
pub fn prepare_variant<P: AsRef<Path>>(
    store: &DirectoryStore,
    variant: MeshVariant,
    base: P,
    additions: &[PathBuf],
) -> Result<PathBuf> {
    let mesh = prepare_mesh(base, additions)?;

    std::fs::create_dir_all(store.data_dir())?;
    let path = store.path_for(variant);
    write_cache_file(&mesh, &path)?;

    info!(
        variant = %variant,
        path = %path.display(),
        vertices = mesh.vertex_count(),
        uvs = mesh.uv_count(),
        additions = additions.len(),
        "Prepared mesh variant"
    );
    Ok(path)
}
