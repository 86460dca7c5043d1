use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::ObjectStore;
use crate::error::LoadError;

/// Object store laid out on local disk as `<root>/<container>/<key>`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf, LoadError> {
        for part in [container, key] {
            let escapes = Path::new(part)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if part.is_empty() || escapes {
                return Err(LoadError::ObjectNotFound {
                    container: container.to_string(),
                    key: key.to_string(),
                });
            }
        }
        Ok(self.root.join(container).join(key))
    }
}

impl ObjectStore for FsObjectStore {
    fn get_object(&self, container: &str, key: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.object_path(container, key)?;
        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(container, key, bytes = bytes.len(), "Read object from disk");
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(LoadError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(LoadError::Connectivity(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(container: &str, key: &str, body: &[u8]) -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(container).join(key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, body).unwrap();
        let store = FsObjectStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn reads_existing_object() {
        let (_dir, store) = store_with("results", "sentiment.json", b"[1]");
        assert_eq!(store.get_object("results", "sentiment.json").unwrap(), b"[1]");
    }

    #[test]
    fn nested_keys_resolve() {
        let (_dir, store) = store_with("results", "daily/sentiment.json", b"[]");
        assert!(store.get_object("results", "daily/sentiment.json").is_ok());
    }

    #[test]
    fn missing_object_is_not_found() {
        let (_dir, store) = store_with("results", "sentiment.json", b"[]");
        let err = store.get_object("results", "topics.json").unwrap_err();
        assert!(matches!(err, LoadError::ObjectNotFound { .. }));
    }

    #[test]
    fn parent_traversal_rejected() {
        let (_dir, store) = store_with("results", "sentiment.json", b"[]");
        let err = store.get_object("results", "../results/sentiment.json").unwrap_err();
        assert!(matches!(err, LoadError::ObjectNotFound { .. }));
        assert!(store.get_object("", "sentiment.json").is_err());
    }
}
