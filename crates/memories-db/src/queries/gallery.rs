//! Gallery image CRUD operations.

use memories_common::{Error, GalleryItem, Result, RowId};
use rusqlite::Connection;

use crate::models::{now, timestamp};

use super::collect_rows;

const COLS: &str = "id, image_url, \"order\", created_at";

/// Append a photo with the given order key.
pub fn insert_gallery_item(conn: &Connection, image_url: &str, order: u32) -> Result<GalleryItem> {
    let id = RowId::new();
    let created_at = now();

    conn.execute(
        "INSERT INTO gallery_images (id, image_url, \"order\", created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id.to_string(), image_url, order, timestamp(created_at)],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(GalleryItem {
        id,
        image_url: image_url.to_string(),
        order,
        created_at,
    })
}

/// List all photos by ascending order key.
pub fn list_gallery_items(conn: &Connection) -> Result<Vec<GalleryItem>> {
    let q = format!(
        "SELECT {COLS} FROM gallery_images ORDER BY \"order\" ASC, created_at ASC, rowid ASC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, [])
}
