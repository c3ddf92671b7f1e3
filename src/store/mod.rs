//! The content store seam.
//!
//! This module defines the [`ContentStore`] trait the ingestion service and
//! the admin operations talk to, along with two backends: [`LocalContentStore`]
//! (SQLite rows plus a filesystem bucket) and [`MemoryContentStore`] (in-process
//! state with fault injection).
//!
//! Every call is a single request with a binary outcome. The trait makes no
//! promise of atomicity across calls: reading the maximum order key and
//! inserting a row are separate requests.

mod local;
mod memory;

pub use local::LocalContentStore;
pub use memory::MemoryContentStore;

use async_trait::async_trait;
use memories_common::{
    Collection, GalleryItem, NewRow, OrderKey, Result, RowId, Session, SiteContent, SliderItem,
    StoredAsset,
};

/// Backend holding rows, objects and sessions.
///
/// Implementations are shared across tasks behind an `Arc<dyn ContentStore>`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// The session this store acts under, or `None` when signed out or expired.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Highest order key in `collection`, 0 when it is empty.
    async fn max_order_key(&self, collection: Collection) -> Result<u32>;

    /// Store `bytes` at `path` in `bucket`, overwriting any existing object.
    async fn upload_asset(&self, bucket: &str, path: &str, bytes: &[u8]) -> Result<StoredAsset>;

    /// Append a row to its collection.
    async fn insert_row(&self, row: NewRow) -> Result<RowId>;

    /// Delete all listed rows in one request. Unknown ids are ignored.
    async fn delete_rows(&self, collection: Collection, ids: &[RowId]) -> Result<usize>;

    /// Every row's key in display order (key, then insertion order).
    async fn order_keys(&self, collection: Collection) -> Result<Vec<OrderKey>>;

    /// Overwrite one row's key. Returns false if the row does not exist.
    async fn set_order_key(&self, collection: Collection, id: RowId, key: u32) -> Result<bool>;

    /// Point the slide(s) at `position` to a new image. Returns rows changed.
    async fn update_slider_image(&self, position: u32, image_url: &str) -> Result<usize>;

    /// Change one slide's caption. Returns false if the slide does not exist.
    async fn update_slider_caption(&self, id: RowId, caption: &str) -> Result<bool>;

    async fn slider_items(&self) -> Result<Vec<SliderItem>>;

    async fn gallery_items(&self) -> Result<Vec<GalleryItem>>;

    async fn site_content(&self) -> Result<Option<SiteContent>>;

    /// Persist `content` wholesale. Returns the stored row, `None` if its id is unknown.
    async fn update_site_content(&self, content: &SiteContent) -> Result<Option<SiteContent>>;
}
