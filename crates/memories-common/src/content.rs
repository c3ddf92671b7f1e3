//! Content-domain types shared by the store, database and ingestion layers.
//!
//! Enums serialize in lowercase and implement `Display` manually for a
//! consistent string representation in logs, paths and CLI arguments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::{RowId, SessionId, SiteContentId, UserId};

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// One of the two ordered image collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Captioned slides ordered by `position`.
    Slider,
    /// Uncaptioned photos ordered by `order`.
    Gallery,
}

impl Collection {
    /// Noun used in human-readable summaries.
    pub fn noun(&self, count: usize) -> &'static str {
        match (self, count) {
            (Self::Slider, 1) => "slide",
            (Self::Slider, _) => "slides",
            (Self::Gallery, 1) => "photo",
            (Self::Gallery, _) => "photos",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slider => write!(f, "slider"),
            Self::Gallery => write!(f, "gallery"),
        }
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slider" | "slides" => Ok(Self::Slider),
            "gallery" | "photos" => Ok(Self::Gallery),
            _ => Err(format!("Unknown collection: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A captioned slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderItem {
    pub id: RowId,
    pub position: u32,
    pub image_url: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
}

/// A gallery photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: RowId,
    pub image_url: String,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

/// A row about to be appended to a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewRow {
    Slider {
        image_url: String,
        caption: String,
        position: u32,
    },
    Gallery {
        image_url: String,
        order: u32,
    },
}

impl NewRow {
    /// Build the row for an uploaded asset, applying the default slide caption.
    pub fn for_collection(collection: Collection, image_url: String, key: u32) -> Self {
        match collection {
            Collection::Slider => Self::Slider {
                image_url,
                caption: format!("Slide {key}"),
                position: key,
            },
            Collection::Gallery => Self::Gallery {
                image_url,
                order: key,
            },
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Self::Slider { .. } => Collection::Slider,
            Self::Gallery { .. } => Collection::Gallery,
        }
    }

    pub fn order_key(&self) -> u32 {
        match self {
            Self::Slider { position, .. } => *position,
            Self::Gallery { order, .. } => *order,
        }
    }

    pub fn image_url(&self) -> &str {
        match self {
            Self::Slider { image_url, .. } | Self::Gallery { image_url, .. } => image_url,
        }
    }
}

/// `(id, key)` pair of one row, used when renumbering a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub id: RowId,
    pub key: u32,
}

// ---------------------------------------------------------------------------
// Site content
// ---------------------------------------------------------------------------

/// The singleton row holding the landing page text and hero image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContent {
    pub id: SiteContentId,
    pub couple_name: String,
    pub start_date: String,
    pub about_text: String,
    pub letter_text: String,
    pub hero_subtitle: String,
    pub hero_image_url: String,
    /// Vertical focal point of the hero image, in percent (0-100).
    pub hero_image_position: u8,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of [`SiteContent`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContentUpdate {
    pub couple_name: Option<String>,
    pub start_date: Option<String>,
    pub about_text: Option<String>,
    pub letter_text: Option<String>,
    pub hero_subtitle: Option<String>,
    pub hero_image_url: Option<String>,
    pub hero_image_position: Option<u8>,
}

impl SiteContentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the present fields onto `content`.
    pub fn apply_to(self, content: &mut SiteContent) {
        if let Some(v) = self.couple_name {
            content.couple_name = v;
        }
        if let Some(v) = self.start_date {
            content.start_date = v;
        }
        if let Some(v) = self.about_text {
            content.about_text = v;
        }
        if let Some(v) = self.letter_text {
            content.letter_text = v;
        }
        if let Some(v) = self.hero_subtitle {
            content.hero_subtitle = v;
        }
        if let Some(v) = self.hero_image_url {
            content.hero_image_url = v;
        }
        if let Some(v) = self.hero_image_position {
            content.hero_image_position = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Assets and sessions
// ---------------------------------------------------------------------------

/// A binary asset submitted for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Asset {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// An object persisted in a storage bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub bucket: String,
    pub path: String,
    pub public_url: String,
    pub size: u64,
    /// First 16 hex chars of the SHA-256 of the content.
    pub etag: String,
}

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
