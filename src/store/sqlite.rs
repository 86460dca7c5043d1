use std::path::Path;

use tracing::{debug, info};

use super::DocumentStore;
use crate::db::{self, DbPool};
use crate::error::LoadError;
use crate::migrations;
use crate::types::stream::StreamDocument;

/// Document store persisted as JSON bodies in a local SQLite file.
///
/// Bodies are validated into [`StreamDocument`] on read, so a malformed
/// document surfaces here rather than as a type mismatch downstream.
pub struct SqliteDocumentStore {
    pool: DbPool,
}

fn connectivity(path: &Path) -> impl Fn(Box<dyn std::error::Error>) -> LoadError + '_ {
    move |e: Box<dyn std::error::Error>| LoadError::Connectivity(format!("{}: {}", path.display(), e))
}

impl SqliteDocumentStore {
    /// Open an existing store read-only. A missing file is a connectivity
    /// failure; nothing is created.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let pool = db::open_read_only_pool(path).map_err(connectivity(path))?;
        Ok(Self { pool })
    }

    /// Open the store for writing, creating the file and applying migrations.
    pub fn create(path: &Path) -> Result<Self, LoadError> {
        let pool = db::create_pool(path).map_err(connectivity(path))?;
        db::init_db(&pool).map_err(connectivity(path))?;
        let applied = migrations::run_pending(&pool).map_err(connectivity(path))?;
        if !applied.is_empty() {
            info!(path = %path.display(), migrations = ?applied, "Applied document store migrations");
        }
        Ok(Self { pool })
    }

    /// Insert or replace a document body verbatim.
    pub fn insert_raw(&self, collection: &str, id: &str, body: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, id) DO UPDATE SET body = ?3, updated_at = datetime('now')",
            [collection, id, body],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn insert(&self, collection: &str, document: &StreamDocument) -> Result<(), String> {
        let body = serde_json::to_string(document).map_err(|e| e.to_string())?;
        self.insert_raw(collection, &document.id, &body)
    }

    /// Load a JSON array of stream documents into `collection`, replacing
    /// documents with the same `_id`. Every document is validated before
    /// any is written.
    pub fn import_json(&self, collection: &str, payload: &[u8]) -> Result<usize, LoadError> {
        let documents: Vec<StreamDocument> =
            serde_json::from_slice(payload).map_err(|e| LoadError::Decode(e.to_string()))?;
        for document in &documents {
            self.insert(collection, document)
                .map_err(LoadError::Connectivity)?;
        }
        Ok(documents.len())
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn find_all(&self, collection: &str) -> Result<Vec<StreamDocument>, LoadError> {
        let conn = self
            .pool
            .get()
            .map_err(|e| LoadError::Connectivity(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY rowid")
            .map_err(|e| LoadError::Connectivity(e.to_string()))?;
        let rows = stmt
            .query_map([collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| LoadError::Connectivity(e.to_string()))?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, body) = row.map_err(|e| LoadError::Connectivity(e.to_string()))?;
            let document: StreamDocument = serde_json::from_str(&body)
                .map_err(|e| LoadError::malformed(format!("document '{}'", id), e.to_string()))?;
            documents.push(document);
        }
        debug!(collection, documents = documents.len(), "Queried stream documents");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::stream::BucketAggregate;
    use std::collections::BTreeMap;

    fn test_store() -> (tempfile::TempDir, SqliteDocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteDocumentStore::create(&dir.path().join("stream.sqlite")).unwrap();
        (dir, store)
    }

    fn reader(dir: &tempfile::TempDir) -> SqliteDocumentStore {
        SqliteDocumentStore::open(&dir.path().join("stream.sqlite")).unwrap()
    }

    fn doc(id: &str, buckets: &[(&str, u64, u64, u64)]) -> StreamDocument {
        let sentiment_data: BTreeMap<String, BucketAggregate> = buckets
            .iter()
            .map(|&(ts, p, n, u)| (ts.to_string(), BucketAggregate::new(p, n, u)))
            .collect();
        StreamDocument {
            id: id.to_string(),
            sentiment_data,
        }
    }

    #[test]
    fn find_all_empty_collection() {
        let (_dir, store) = test_store();
        assert!(store.find_all("real-time").unwrap().is_empty());
    }

    #[test]
    fn insert_and_find_roundtrip() {
        let (_dir, store) = test_store();
        let d = doc("2023-01-01", &[("2023-01-01T10:00", 5, 1, 2)]);
        store.insert("real-time", &d).unwrap();
        assert_eq!(store.find_all("real-time").unwrap(), vec![d]);
    }

    #[test]
    fn find_all_yields_insertion_order() {
        let (_dir, store) = test_store();
        store.insert("real-time", &doc("2023-01-02", &[])).unwrap();
        store.insert("real-time", &doc("2023-01-01", &[])).unwrap();
        let ids: Vec<String> = store
            .find_all("real-time")
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["2023-01-02", "2023-01-01"]);
    }

    #[test]
    fn collections_are_isolated() {
        let (_dir, store) = test_store();
        store.insert("real-time", &doc("2023-01-01", &[])).unwrap();
        store.insert("archive", &doc("2022-12-31", &[])).unwrap();
        assert_eq!(store.find_all("real-time").unwrap().len(), 1);
        assert_eq!(store.find_all("archive").unwrap()[0].id, "2022-12-31");
    }

    #[test]
    fn insert_replaces_existing_document() {
        let (_dir, store) = test_store();
        store
            .insert("real-time", &doc("2023-01-01", &[("2023-01-01T10:00", 1, 0, 0)]))
            .unwrap();
        store
            .insert("real-time", &doc("2023-01-01", &[("2023-01-01T10:00", 7, 0, 0)]))
            .unwrap();
        let docs = store.find_all("real-time").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].sentiment_data["2023-01-01T10:00"].positive(), 7);
    }

    #[test]
    fn malformed_body_is_malformed_record() {
        let (_dir, store) = test_store();
        store
            .insert_raw("real-time", "2023-01-01", r#"{"_id": "2023-01-01"}"#)
            .unwrap();
        let err = store.find_all("real-time").unwrap_err();
        match err {
            LoadError::MalformedRecord { record, .. } => assert!(record.contains("2023-01-01")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reader_sees_written_documents() {
        let (dir, store) = test_store();
        store.insert("real-time", &doc("2023-01-01", &[])).unwrap();
        drop(store);
        assert_eq!(reader(&dir).find_all("real-time").unwrap().len(), 1);
    }

    #[test]
    fn open_missing_file_is_connectivity_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_pipeline.sqlite");
        let err = SqliteDocumentStore::open(&path).err().unwrap();
        assert!(matches!(err, LoadError::Connectivity(_)));
        assert!(!path.exists());
    }

    #[test]
    fn open_foreign_sqlite_file_fails_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.sqlite");
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE unrelated (id INTEGER);")
            .unwrap();
        let store = SqliteDocumentStore::open(&path).unwrap();
        let err = store.find_all("real-time").unwrap_err();
        assert!(matches!(err, LoadError::Connectivity(_)));
    }

    #[test]
    fn reader_does_not_write() {
        let (dir, store) = test_store();
        drop(store);
        let reader = reader(&dir);
        assert!(reader.insert("real-time", &doc("2023-01-01", &[])).is_err());
    }

    #[test]
    fn float_counts_from_pipeline_are_accepted() {
        let (dir, store) = test_store();
        store
            .insert_raw(
                "real-time",
                "2023-01-01",
                r#"{"_id":"2023-01-01","sentiment_data":{"2023-01-01T10:00":
                    {"positive_count":5.0,"negative_count":1,"neutral_count":2.0}}}"#,
            )
            .unwrap();
        let docs = reader(&dir).find_all("real-time").unwrap();
        assert_eq!(
            docs[0].sentiment_data["2023-01-01T10:00"],
            BucketAggregate::new(5, 1, 2)
        );
    }

    #[test]
    fn import_json_validates_then_writes() {
        let (dir, store) = test_store();
        let payload = br#"[
            {"_id":"2023-01-01","sentiment_data":{"2023-01-01T10:00":{"positive_count":5}}},
            {"_id":"2023-01-02","sentiment_data":{}}
        ]"#;
        assert_eq!(store.import_json("real-time", payload).unwrap(), 2);
        assert_eq!(reader(&dir).find_all("real-time").unwrap().len(), 2);

        let bad = br#"[{"_id":"2023-01-03","sentiment_data":{}}, {"_id":"2023-01-04"}]"#;
        assert!(matches!(
            store.import_json("real-time", bad),
            Err(LoadError::Decode(_))
        ));
        assert_eq!(reader(&dir).find_all("real-time").unwrap().len(), 2);
    }
}
