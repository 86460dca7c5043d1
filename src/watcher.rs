use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::config::AppConfig;
use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    ObjectChanged { path: PathBuf },
    DocumentsChanged,
}

/// Local files whose changes should trigger a fresh render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTargets {
    /// Root of a filesystem object store; `None` for HTTP endpoints.
    pub objects_root: Option<PathBuf>,
    pub document_db: PathBuf,
}

fn absolute(path: &Path) -> PathBuf {
    if let Ok(p) = std::fs::canonicalize(path) {
        return p;
    }
    // The SQLite file may not exist yet; resolve its directory instead.
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => std::fs::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

impl WatchTargets {
    pub fn from_config(config: &AppConfig) -> Result<Self, LoadError> {
        let endpoint = config.object_store.endpoint.as_str();
        let objects_root = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            None
        } else {
            let root = endpoint.strip_prefix("file://").unwrap_or(endpoint);
            Some(absolute(Path::new(root)))
        };
        Ok(Self {
            objects_root,
            document_db: absolute(&config.document_store.path()?),
        })
    }

    fn is_document_file(&self, path: &Path) -> bool {
        // Covers the database itself plus its -wal and -shm companions.
        let (Some(db_name), Some(name)) = (self.document_db.file_name(), path.file_name()) else {
            return false;
        };
        path.parent() == self.document_db.parent()
            && name.to_string_lossy().starts_with(db_name.to_string_lossy().as_ref())
    }
}

pub fn classify_event(event: &Event, targets: &WatchTargets) -> Option<WatchEvent> {
    match event.kind {
        EventKind::Modify(_) | EventKind::Create(_) => {
            for path in &event.paths {
                if targets.is_document_file(path) {
                    return Some(WatchEvent::DocumentsChanged);
                }
                let under_objects = targets
                    .objects_root
                    .as_ref()
                    .is_some_and(|root| path.starts_with(root));
                if under_objects && path.extension().map_or(false, |ext| ext == "json") {
                    return Some(WatchEvent::ObjectChanged { path: path.clone() });
                }
            }
            None
        }
        _ => None,
    }
}

/// Start watching `targets`, forwarding classified events to `tx`.
pub fn create_watcher(
    tx: mpsc::Sender<WatchEvent>,
    targets: WatchTargets,
) -> Result<RecommendedWatcher, notify::Error> {
    let objects_root = targets.objects_root.clone();
    let db_dir = targets.document_db.parent().map(Path::to_path_buf);

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            if let Some(watch_event) = classify_event(&event, &targets) {
                let _ = tx.send(watch_event);
            }
        }
    })?;

    if let Some(root) = objects_root {
        watcher.watch(&root, RecursiveMode::Recursive)?;
    }
    if let Some(dir) = db_dir {
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    }
    Ok(watcher)
}
