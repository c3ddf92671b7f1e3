//! Slider image CRUD operations.

use memories_common::{Error, Result, RowId, SliderItem};
use rusqlite::Connection;

use crate::models::{now, timestamp, FromRow};

use super::collect_rows;

const COLS: &str = "id, position, image_url, caption, created_at";

/// Append a slide at `position`.
pub fn insert_slider_item(
    conn: &Connection,
    image_url: &str,
    caption: &str,
    position: u32,
) -> Result<SliderItem> {
    let id = RowId::new();
    let created_at = now();

    conn.execute(
        "INSERT INTO slider_images (id, position, image_url, caption, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id.to_string(), position, image_url, caption, timestamp(created_at)],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(SliderItem {
        id,
        position,
        image_url: image_url.to_string(),
        caption: caption.to_string(),
        created_at,
    })
}

/// Get a slide by primary key.
pub fn get_slider_item(conn: &Connection, id: RowId) -> Result<Option<SliderItem>> {
    let q = format!("SELECT {COLS} FROM slider_images WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], SliderItem::from_row) {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all slides by ascending position.
pub fn list_slider_items(conn: &Connection) -> Result<Vec<SliderItem>> {
    let q = format!(
        "SELECT {COLS} FROM slider_images ORDER BY position ASC, created_at ASC, rowid ASC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    collect_rows(&mut stmt, [])
}

/// Point every slide at `position` to a new image. Returns rows changed.
pub fn update_image_at_position(conn: &Connection, position: u32, image_url: &str) -> Result<usize> {
    conn.execute(
        "UPDATE slider_images SET image_url = ?1 WHERE position = ?2",
        rusqlite::params![image_url, position],
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Change a slide's caption. Returns true if the slide exists.
pub fn update_caption(conn: &Connection, id: RowId, caption: &str) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE slider_images SET caption = ?1 WHERE id = ?2",
            rusqlite::params![caption, id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
