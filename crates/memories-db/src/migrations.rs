//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use memories_common::{Error, Result};
use rusqlite::Connection;

/// V1: initial schema.
///
/// Order keys are indexed but deliberately not unique: concurrent batches
/// may write the same key until a repair renumbers the collection.
const V1_INITIAL: &str = r#"
-- Admin users and sessions
CREATE TABLE users (
    id            TEXT PRIMARY KEY,
    email         TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE auth_tokens (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token      TEXT UNIQUE NOT NULL,
    expires_at TEXT NOT NULL
);

-- Landing page singleton
CREATE TABLE site_content (
    id                  TEXT PRIMARY KEY,
    couple_name         TEXT NOT NULL DEFAULT '',
    start_date          TEXT NOT NULL DEFAULT '',
    about_text          TEXT NOT NULL DEFAULT '',
    letter_text         TEXT NOT NULL DEFAULT '',
    hero_subtitle       TEXT NOT NULL DEFAULT '',
    hero_image_url      TEXT NOT NULL DEFAULT '',
    hero_image_position INTEGER NOT NULL DEFAULT 50
        CHECK (hero_image_position BETWEEN 0 AND 100),
    updated_at          TEXT NOT NULL
);

-- Ordered collections
CREATE TABLE slider_images (
    id         TEXT PRIMARY KEY,
    position   INTEGER NOT NULL CHECK (position > 0),
    image_url  TEXT NOT NULL,
    caption    TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);
CREATE INDEX idx_slider_images_position ON slider_images(position);

CREATE TABLE gallery_images (
    id         TEXT PRIMARY KEY,
    image_url  TEXT NOT NULL,
    "order"    INTEGER NOT NULL CHECK ("order" > 0),
    created_at TEXT NOT NULL
);
CREATE INDEX idx_gallery_images_order ON gallery_images("order");
"#;

/// V2: seed the singleton site content row.
const V2_SEED_SITE_CONTENT: &str = r#"
INSERT INTO site_content (id, updated_at)
VALUES ('6f1c2a7e-3b0d-4c55-9a1e-5d2f8b7c9e01', strftime('%Y-%m-%dT%H:%M:%SZ', 'now'));
"#;

/// All migrations in order.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL), (2, V2_SEED_SITE_CONTENT)];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;

        tracing::info!(version, "applied database migration");
    }

    Ok(())
}
