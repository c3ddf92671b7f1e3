//! Singleton site content operations.
//!
//! The row is seeded by migration V2 and never created or deleted here.

use memories_common::{Error, Result, SiteContent};
use rusqlite::Connection;

use crate::models::{now, timestamp, FromRow};

const COLS: &str = "id, couple_name, start_date, about_text, letter_text, hero_subtitle, \
                    hero_image_url, hero_image_position, updated_at";

/// Fetch the site content row.
pub fn get_site_content(conn: &Connection) -> Result<Option<SiteContent>> {
    let q = format!("SELECT {COLS} FROM site_content ORDER BY updated_at DESC LIMIT 1");
    match conn.query_row(&q, [], SiteContent::from_row) {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Overwrite every editable column of the row identified by `content.id`
/// and stamp `updated_at`. Returns the stored row, or `None` if no row has
/// that id.
pub fn update_site_content(conn: &Connection, content: &SiteContent) -> Result<Option<SiteContent>> {
    let updated_at = now();
    let n = conn
        .execute(
            "UPDATE site_content SET
                couple_name = ?1, start_date = ?2, about_text = ?3, letter_text = ?4,
                hero_subtitle = ?5, hero_image_url = ?6, hero_image_position = ?7,
                updated_at = ?8
             WHERE id = ?9",
            rusqlite::params![
                content.couple_name,
                content.start_date,
                content.about_text,
                content.letter_text,
                content.hero_subtitle,
                content.hero_image_url,
                content.hero_image_position,
                timestamp(updated_at),
                content.id.to_string(),
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if n == 0 {
        return Ok(None);
    }

    Ok(Some(SiteContent {
        updated_at,
        ..content.clone()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use memories_common::SiteContentId;

    #[test]
    fn seeded_row_exists() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let content = get_site_content(&conn).unwrap().unwrap();
        assert_eq!(content.hero_image_position, 50);
        assert!(content.couple_name.is_empty());
    }

    #[test]
    fn update_roundtrip() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let mut content = get_site_content(&conn).unwrap().unwrap();
        content.couple_name = "Rani & Dimas".into();
        content.hero_image_position = 30;

        let stored = update_site_content(&conn, &content).unwrap().unwrap();
        assert!(stored.updated_at >= content.updated_at);

        let found = get_site_content(&conn).unwrap().unwrap();
        assert_eq!(found.couple_name, "Rani & Dimas");
        assert_eq!(found.hero_image_position, 30);
    }

    #[test]
    fn update_unknown_id() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let mut content = get_site_content(&conn).unwrap().unwrap();
        content.id = SiteContentId::new();
        assert!(update_site_content(&conn, &content).unwrap().is_none());
    }

    #[test]
    fn position_out_of_range_is_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let mut content = get_site_content(&conn).unwrap().unwrap();
        content.hero_image_position = 101;
        assert!(update_site_content(&conn, &content).is_err());
    }
}
