//! File-based storage for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::project::ProjectDocument;
use std::fs;
use std::path::PathBuf;

/// File extension for project files.
pub const PROJECT_EXTENSION: &str = "lumalayout";

/// Stores projects as `.lumalayout` JSON files in one directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at the given directory, creating it if
    /// needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("failed to create storage directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default per-user location.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("could not determine home directory".to_string()))?;
        Self::new(base.join("lumalayout").join("projects"))
    }

    /// Resolve the file path for a project name, sanitized for filenames.
    fn project_path(&self, name: &str) -> PathBuf {
        let safe: String = name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{safe}.{PROJECT_EXTENSION}"))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, name: &str, document: &ProjectDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.project_path(name);
        let json = match document.to_json() {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            fs::write(&path, json)
                .map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<ProjectDocument>> {
        let path = self.project_path(name);
        let name_owned = name.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(name_owned));
            }
            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("failed to read {}: {e}", path.display())))?;
            ProjectDocument::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("failed to parse {}: {e}", path.display()))
            })
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.project_path(name);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("failed to read directory: {e}")))?;

            let mut names = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                let is_project = path
                    .extension()
                    .map(|e| e == PROJECT_EXTENSION)
                    .unwrap_or(false);
                if is_project {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.push(stem.to_string());
                    }
                }
            }
            Ok(names)
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.project_path(name);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::storage::block_on;
    use tempfile::tempdir;

    fn document(name: &str) -> ProjectDocument {
        let scene = Scene::new(name);
        let id = scene.id;
        ProjectDocument::new(vec![scene], id)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let doc = document("Stage A");
        block_on(storage.save("stage-a", &doc)).unwrap();
        let loaded = block_on(storage.load("stage-a")).unwrap();
        assert_eq!(loaded.scenes[0].name, "Stage A");
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            block_on(storage.load("missing")),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_only_project_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("one", &document("One"))).unwrap();
        block_on(storage.save("two", &document("Two"))).unwrap();
        fs::write(dir.path().join("stray.txt"), "ignored").unwrap();

        let mut list = block_on(storage.list()).unwrap();
        list.sort();
        assert_eq!(list, vec!["one", "two"]);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("gone", &document("Gone"))).unwrap();
        assert!(block_on(storage.exists("gone")).unwrap());
        block_on(storage.delete("gone")).unwrap();
        assert!(!block_on(storage.exists("gone")).unwrap());
    }

    #[test]
    fn test_sanitizes_project_name() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let doc = document("Weird");
        block_on(storage.save("act one: night/exterior", &doc)).unwrap();
        let loaded = block_on(storage.load("act one: night/exterior")).unwrap();
        assert_eq!(loaded.scenes[0].name, "Weird");
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        fs::write(dir.path().join("bad.lumalayout"), "{ nope").unwrap();
        assert!(matches!(
            block_on(storage.load("bad")),
            Err(StorageError::Serialization(_))
        ));
    }
}
