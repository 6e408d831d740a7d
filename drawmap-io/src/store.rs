//! Directory-backed mesh store
//!
//! Prepared mesh caches live side by side in one data directory, named after
//! their variant: `<data_dir>/male_right.dmc`, `<data_dir>/female_left.dmc`, ...
//! Each variant is read once and shared between sessions.

use crate::cache::{read_cache_file, CACHE_EXTENSION};
use drawmap_core::{Error, MeshData, MeshStore, MeshVariant, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Mesh store reading cache files from a directory
#[derive(Debug)]
pub struct DirectoryStore {
    data_dir: PathBuf,
    loaded: Mutex<HashMap<MeshVariant, Arc<MeshData>>>,
}

impl DirectoryStore {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Cache file path for a variant
    pub fn path_for(&self, variant: MeshVariant) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", variant.file_stem(), CACHE_EXTENSION))
    }

    /// Variants with a cache file present
    pub fn available_variants(&self) -> Vec<MeshVariant> {
        MeshVariant::ALL
            .into_iter()
            .filter(|&variant| self.path_for(variant).is_file())
            .collect()
    }
}

impl MeshStore for DirectoryStore {
    fn load_variant(&self, variant: MeshVariant) -> Result<Arc<MeshData>> {
        let mut loaded = self
            .loaded
            .lock()
            .map_err(|_| Error::InvalidData("mesh store lock poisoned".to_string()))?;
        if let Some(mesh) = loaded.get(&variant) {
            return Ok(Arc::clone(mesh));
        }

        let path = self.path_for(variant);
        let mesh = Arc::new(read_cache_file(&path)?);
        info!(
            variant = %variant,
            path = %path.display(),
            vertices = mesh.vertex_count(),
            "Loaded mesh variant"
        );
        loaded.insert(variant, Arc::clone(&mesh));
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::write_cache_file;
    use drawmap_core::{Point3d, Side, Sex, UvMap, UvPoint};
    use tempfile::tempdir;

    fn triangle() -> MeshData {
        MeshData::new(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
            UvMap::new(
                vec![
                    UvPoint::new(0.1, 0.1),
                    UvPoint::new(0.9, 0.1),
                    UvPoint::new(0.1, 0.9),
                ],
                vec![0, 1, 2],
            ),
        )
        .unwrap()
    }

    #[test]
    fn test_paths_follow_variant_names() {
        let store = DirectoryStore::new("/data/meshes");
        let variant = MeshVariant::new(Sex::Female, Side::Left);
        assert_eq!(
            store.path_for(variant),
            PathBuf::from("/data/meshes/female_left.dmc")
        );
    }

    #[test]
    fn test_load_variant_is_shared() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let variant = MeshVariant::new(Sex::Male, Side::Right);
        write_cache_file(&triangle(), store.path_for(variant)).unwrap();

        assert_eq!(store.available_variants(), vec![variant]);

        let first = store.load_variant(variant).unwrap();
        let second = store.load_variant(variant).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, triangle());
    }

    #[test]
    fn test_missing_variant_is_not_found() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        match store.load_variant(MeshVariant::new(Sex::Female, Side::Right)) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
