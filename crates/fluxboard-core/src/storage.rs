//! Storage abstraction for persistence.
//!
//! Documents travel as [`SceneFile`] values; a backend only ever sees JSON.

use crate::serialize::SceneFile;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A document storage backend. Implementations keep documents in memory,
/// on the filesystem, or anywhere else that can hold JSON by id.
pub trait Storage: Send + Sync {
    fn save(&self, id: &str, document: &SceneFile) -> StorageResult<()>;

    fn load(&self, id: &str) -> StorageResult<SceneFile>;

    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all document ids, in no particular order.
    fn list(&self) -> StorageResult<Vec<String>>;

    fn exists(&self, id: &str) -> StorageResult<bool>;
}

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, SceneFile>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &SceneFile) -> StorageResult<()> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        docs.insert(id.to_string(), document.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<SceneFile> {
        let docs = self
            .documents
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        docs.get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        docs.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        Ok(docs.keys().cloned().collect())
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let docs = self
            .documents
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
        Ok(docs.contains_key(id))
    }
}

/// File-based storage. Each document is one JSON file in the base
/// directory, named `{id}.json` after sanitizing the id.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create file storage rooted at the given directory, creating it if
    /// it does not exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("failed to create storage directory: {e}")))?;
        }
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn document_path(&self, id: &str) -> PathBuf {
        // Ids must be safe for filenames.
        let safe_id: String = id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &SceneFile) -> StorageResult<()> {
        let path = self.document_path(id);
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))
    }

    fn load(&self, id: &str) -> StorageResult<SceneFile> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("failed to read {}: {e}", path.display())))?;
        SceneFile::from_json(&json).map_err(|e| {
            StorageError::Serialization(format!("failed to parse {}: {e}", path.display()))
        })
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.document_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("failed to delete {}: {e}", path.display())))?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("failed to list documents: {e}")))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::Io(e.to_string()))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.document_path(id).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::scene::{Node, NodeKind, Scene};
    use kurbo::Point;

    fn sample_file() -> SceneFile {
        let mut scene = Scene::new();
        scene.add_node(Node::new(NodeKind::Cache, Point::new(40.0, 60.0)));
        SceneFile::from_scene(&scene, &Camera::new())
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        let doc = sample_file();

        storage.save("doc-1", &doc).unwrap();
        assert!(storage.exists("doc-1").unwrap());

        let loaded = storage.load("doc-1").unwrap();
        assert_eq!(loaded.nodes.len(), 1);

        storage.delete("doc-1").unwrap();
        assert!(!storage.exists("doc-1").unwrap());
        assert!(matches!(
            storage.load("doc-1"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = sample_file();

        storage.save("diagram", &doc).unwrap();
        assert!(dir.path().join("diagram.json").exists());

        let loaded = storage.load("diagram").unwrap();
        assert_eq!(loaded.nodes[0].kind, NodeKind::Cache);

        assert_eq!(storage.list().unwrap(), vec!["diagram".to_string()]);

        storage.delete("diagram").unwrap();
        assert!(!storage.exists("diagram").unwrap());
    }

    #[test]
    fn test_file_ids_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("../evil/doc", &sample_file()).unwrap();
        assert!(dir.path().join("___evil_doc.json").exists());
        assert!(storage.exists("../evil/doc").unwrap());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            storage.load("nope"),
            Err(StorageError::NotFound(_))
        ));
    }
}
