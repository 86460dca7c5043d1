use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::{Path, PathBuf};

pub type DbPool = Pool<SqliteConnectionManager>;

/// `~/.sentiwatch`, or `None` when no home directory can be determined.
pub fn sentiwatch_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sentiwatch"))
}

/// Open a writable pool over `db_path`, creating the file and its directory.
/// Only the import path writes; renders go through [`open_read_only_pool`].
pub fn create_pool(db_path: &Path) -> Result<DbPool, Box<dyn std::error::Error>> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let manager = SqliteConnectionManager::file(db_path);
    let pool = Pool::builder().max_size(2).build(manager)?;

    // WAL lets a render read while an import is writing
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    Ok(pool)
}

/// Open an existing SQLite file for reading. Never creates the file, its
/// directory, or any schema.
///
/// Each render opens its own pool and drops it afterwards, so one
/// connection covers the single sequential reader.
pub fn open_read_only_pool(db_path: &Path) -> Result<DbPool, Box<dyn std::error::Error>> {
    // Checked up front: r2d2 would otherwise retry the failing open until
    // its connection timeout.
    if !db_path.is_file() {
        return Err(format!("database file not found: {}", db_path.display()).into());
    }
    let manager = SqliteConnectionManager::file(db_path).with_flags(
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    );
    let pool = Pool::builder().max_size(1).build(manager)?;
    Ok(pool)
}

pub fn init_db(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_sentiwatch() {
        if let Some(dir) = sentiwatch_data_dir() {
            assert!(dir.ends_with(".sentiwatch"));
        }
    }

    #[test]
    fn create_pool_returns_valid_pool() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.sqlite");
        let pool = create_pool(&db_path).unwrap();
        let conn = pool.get().unwrap();
        conn.execute_batch("SELECT 1").unwrap();
    }

    #[test]
    fn create_pool_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deep").join("test.sqlite");
        let pool = create_pool(&db_path).unwrap();
        let conn = pool.get().unwrap();
        conn.execute_batch("SELECT 1").unwrap();
    }

    #[test]
    fn read_only_pool_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("absent.sqlite");
        assert!(open_read_only_pool(&db_path).is_err());
        assert!(!db_path.exists());
        assert!(!dir.path().join("nested").exists());
    }

    #[test]
    fn read_only_pool_reads_but_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.sqlite");
        {
            let pool = create_pool(&db_path).unwrap();
            init_db(&pool).unwrap();
        }

        let pool = open_read_only_pool(&db_path).unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        assert!(conn
            .execute("INSERT INTO migrations (name) VALUES ('x')", [])
            .is_err());
        assert!(conn.execute_batch("CREATE TABLE scratch (id INTEGER);").is_err());
    }

    #[test]
    fn init_db_creates_migrations_table() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&dir.path().join("test.sqlite")).unwrap();
        init_db(&pool).unwrap();

        let conn = pool.get().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"migrations".to_string()));
    }

    #[test]
    fn init_db_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&dir.path().join("test.sqlite")).unwrap();
        init_db(&pool).unwrap();
        init_db(&pool).unwrap();
    }
}
