//! Read-only adapters for the two external stores the dashboard consumes.
//!
//! Both traits are object safe so a render can pick a concrete backend at
//! runtime from [`crate::config::AppConfig`], and tests can inject fakes.

pub mod fs;
pub mod http;
pub mod sqlite;

use crate::config::{DocumentStoreConfig, ObjectStoreConfig};
use crate::error::LoadError;
use crate::types::stream::StreamDocument;

/// Blob storage holding the batch job's JSON outputs.
pub trait ObjectStore {
    /// Fetch the raw bytes stored under `key` in `container`.
    fn get_object(&self, container: &str, key: &str) -> Result<Vec<u8>, LoadError>;
}

/// Document storage holding one streaming aggregate document per day.
pub trait DocumentStore {
    /// Return every document in `collection`, validated into typed records.
    /// Order is whatever the store yields; callers must not rely on it.
    fn find_all(&self, collection: &str) -> Result<Vec<StreamDocument>, LoadError>;
}

/// Build the object store backend named by the configured endpoint.
pub fn open_object_store(config: &ObjectStoreConfig) -> Result<Box<dyn ObjectStore>, LoadError> {
    let endpoint = config.endpoint.as_str();
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        let store = http::HttpObjectStore::new(endpoint, config.credentials.clone())?;
        Ok(Box::new(store))
    } else {
        let root = endpoint.strip_prefix("file://").unwrap_or(endpoint);
        Ok(Box::new(fs::FsObjectStore::new(root)))
    }
}

/// Open a fresh read-only document store session for one render.
pub fn open_document_store(
    config: &DocumentStoreConfig,
) -> Result<Box<dyn DocumentStore>, LoadError> {
    let store = sqlite::SqliteDocumentStore::open(&config.path()?)?;
    Ok(Box::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccessCredentials;

    #[test]
    fn file_endpoint_opens_fs_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bucket")).unwrap();
        std::fs::write(dir.path().join("bucket").join("k.json"), b"[]").unwrap();

        let config = ObjectStoreConfig {
            endpoint: format!("file://{}", dir.path().display()),
            credentials: None,
        };
        let store = open_object_store(&config).unwrap();
        assert_eq!(store.get_object("bucket", "k.json").unwrap(), b"[]".to_vec());
    }

    #[test]
    fn http_endpoint_opens_http_store() {
        let config = ObjectStoreConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            credentials: Some(AccessCredentials {
                access_key_id: "AKID".to_string(),
                secret_access_key: "secret".to_string(),
            }),
        };
        let store = open_object_store(&config).unwrap();
        let err = store.get_object("bucket", "k.json").unwrap_err();
        assert!(matches!(err, LoadError::Connectivity(_)));
    }

    #[test]
    fn document_store_opens_existing_db() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.sqlite");
        sqlite::SqliteDocumentStore::create(&path).unwrap();
        let config = DocumentStoreConfig {
            url: format!("sqlite://{}", path.display()),
        };
        let store = open_document_store(&config).unwrap();
        assert!(store.find_all("real-time").unwrap().is_empty());
    }

    #[test]
    fn missing_document_db_is_connectivity_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.sqlite");
        let config = DocumentStoreConfig {
            url: format!("sqlite://{}", path.display()),
        };
        assert!(matches!(
            open_document_store(&config),
            Err(LoadError::Connectivity(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn mongodb_url_is_connectivity_error() {
        let config = DocumentStoreConfig {
            url: "mongodb://localhost:27017/cluster0".to_string(),
        };
        assert!(matches!(
            open_document_store(&config),
            Err(LoadError::Connectivity(_))
        ));
    }
}
