//! Row mapping between SQLite and the shared content types.
//!
//! Every mapped type implements [`FromRow`] so query modules can hand it
//! straight to `query_row`/`query_map`. Timestamps are stored as RFC 3339
//! text with a `Z` suffix and fixed microsecond precision, which keeps
//! lexical and chronological order identical.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use memories_common::{GalleryItem, OrderKey, Session, SiteContent, SliderItem, UserId};
use rusqlite::types::Type;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Format a timestamp the way every table stores it.
pub fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision timestamps are stored with, so a returned
/// value compares equal to the same row read back later.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
    Ok(T::from(uuid))
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Construct a value from a result row whose columns follow the owning
/// query module's `COLS` constant.
pub trait FromRow: Sized {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self>;
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl FromRow for User {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: parse_timestamp(row, 3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Session (auth_tokens)
// ---------------------------------------------------------------------------

impl FromRow for Session {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            user_id: parse_id(row, 1)?,
            token: row.get(2)?,
            expires_at: parse_timestamp(row, 3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Site content
// ---------------------------------------------------------------------------

impl FromRow for SiteContent {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            couple_name: row.get(1)?,
            start_date: row.get(2)?,
            about_text: row.get(3)?,
            letter_text: row.get(4)?,
            hero_subtitle: row.get(5)?,
            hero_image_url: row.get(6)?,
            hero_image_position: row.get(7)?,
            updated_at: parse_timestamp(row, 8)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

impl FromRow for SliderItem {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            position: row.get(1)?,
            image_url: row.get(2)?,
            caption: row.get(3)?,
            created_at: parse_timestamp(row, 4)?,
        })
    }
}

impl FromRow for GalleryItem {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            image_url: row.get(1)?,
            order: row.get(2)?,
            created_at: parse_timestamp(row, 3)?,
        })
    }
}

impl FromRow for OrderKey {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            key: row.get(1)?,
        })
    }
}
