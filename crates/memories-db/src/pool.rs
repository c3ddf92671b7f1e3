//! Connection pool management for SQLite via r2d2.

use memories_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on another writer before giving up.
pub const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Open (or create) the site database at `db_path`.
///
/// Every connection gets foreign keys, WAL journaling and a busy timeout of
/// [`BUSY_TIMEOUT_MS`]. Pending migrations run before the pool is returned,
/// so the singleton site content row always exists.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"
        ))
    });

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;

    let conn = get_conn(&pool)?;
    migrations::run_migrations(&conn)?;

    tracing::debug!(path = db_path, "site database ready");
    Ok(pool)
}

/// Initialize an in-memory database pool (useful for tests).
///
/// Each call creates a uniquely-named shared-cache in-memory database so
/// that parallel tests do not interfere with each other, while all
/// connections *within* a single pool still share state.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:memories_memdb_{n}?mode=memory&cache=shared");

    let manager = SqliteConnectionManager::file(uri)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create in-memory pool: {e}")))?;

    let conn = get_conn(&pool)?;
    migrations::run_migrations(&conn)?;

    Ok(pool)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(conn: &PooledConnection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn memory_pool_starts_with_seeded_site_content() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        assert_eq!(count(&conn, "site_content"), 1);
        assert_eq!(count(&conn, "slider_images"), 0);
        assert_eq!(count(&conn, "gallery_images"), 0);
    }

    #[test]
    fn memory_pools_are_isolated() {
        let first = init_memory_pool().unwrap();
        let second = init_memory_pool().unwrap();

        get_conn(&first)
            .unwrap()
            .execute(
                "INSERT INTO gallery_images (id, image_url, \"order\", created_at)
                 VALUES ('g1', '/a.jpg', 1, '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        assert_eq!(count(&get_conn(&first).unwrap(), "gallery_images"), 1);
        assert_eq!(count(&get_conn(&second).unwrap(), "gallery_images"), 0);
    }

    #[test]
    fn file_pool_sets_busy_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_pool(&dir.path().join("memories.db").to_string_lossy()).unwrap();
        let conn = get_conn(&pool).unwrap();

        let busy: u32 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(busy, BUSY_TIMEOUT_MS);

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_file_pool_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memories.db");
        let path = path.to_string_lossy();

        {
            let pool = init_pool(&path).unwrap();
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "UPDATE site_content SET couple_name = 'Persisted'",
                [],
            )
            .unwrap();
        }

        let pool = init_pool(&path).unwrap();
        let conn = get_conn(&pool).unwrap();
        let name: String = conn
            .query_row("SELECT couple_name FROM site_content", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "Persisted");
    }
}
