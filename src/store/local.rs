//! Durable content store: SQLite rows through the pool plus a filesystem bucket.
//!
//! Every database call runs on the blocking thread pool, so a caller's
//! timeout can fire while SQLite waits on a lock.

use async_trait::async_trait;
use chrono::Utc;
use memories_common::{
    Collection, Error, GalleryItem, NewRow, OrderKey, Result, RowId, Session, SiteContent,
    SliderItem, StoredAsset,
};
use memories_db::pool::{get_conn, DbPool, PooledConnection};
use memories_db::queries::{auth, collections, gallery, site_content, slider};
use parking_lot::RwLock;

use super::ContentStore;
use crate::storage::AssetBucket;

/// Content store backed by the local database and bucket directory.
pub struct LocalContentStore {
    pool: DbPool,
    bucket: AssetBucket,
    session_token: RwLock<Option<String>>,
}

impl LocalContentStore {
    /// Create a signed-out store.
    pub fn new(pool: DbPool, bucket: AssetBucket) -> Self {
        Self {
            pool,
            bucket,
            session_token: RwLock::new(None),
        }
    }

    /// Act under the session identified by `token`.
    pub fn with_session_token(self, token: impl Into<String>) -> Self {
        self.set_session_token(Some(token.into()));
        self
    }

    pub fn set_session_token(&self, token: Option<String>) {
        *self.session_token.write() = token;
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    ///
    /// If the awaiting future is dropped the query still runs to completion.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PooledConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn current_session(&self) -> Result<Option<Session>> {
        let Some(token) = self.session_token.read().clone() else {
            return Ok(None);
        };

        let session = self.with_conn(move |conn| auth::get_token(conn, &token)).await?;
        match session {
            Some(session) if session.is_expired_at(Utc::now()) => {
                tracing::debug!(session_id = %session.id, "session token has expired");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn max_order_key(&self, collection: Collection) -> Result<u32> {
        self.with_conn(move |conn| collections::max_order_key(conn, collection))
            .await
    }

    async fn upload_asset(&self, bucket: &str, path: &str, bytes: &[u8]) -> Result<StoredAsset> {
        self.bucket.put(bucket, path, bytes).await
    }

    async fn insert_row(&self, row: NewRow) -> Result<RowId> {
        self.with_conn(move |conn| {
            let id = match row {
                NewRow::Slider {
                    image_url,
                    caption,
                    position,
                } => slider::insert_slider_item(conn, &image_url, &caption, position)?.id,
                NewRow::Gallery { image_url, order } => {
                    gallery::insert_gallery_item(conn, &image_url, order)?.id
                }
            };
            Ok(id)
        })
        .await
    }

    async fn delete_rows(&self, collection: Collection, ids: &[RowId]) -> Result<usize> {
        let ids = ids.to_vec();
        self.with_conn(move |conn| collections::delete_rows(conn, collection, &ids))
            .await
    }

    async fn order_keys(&self, collection: Collection) -> Result<Vec<OrderKey>> {
        self.with_conn(move |conn| collections::order_keys(conn, collection))
            .await
    }

    async fn set_order_key(&self, collection: Collection, id: RowId, key: u32) -> Result<bool> {
        self.with_conn(move |conn| collections::set_order_key(conn, collection, id, key))
            .await
    }

    async fn update_slider_image(&self, position: u32, image_url: &str) -> Result<usize> {
        let image_url = image_url.to_string();
        self.with_conn(move |conn| slider::update_image_at_position(conn, position, &image_url))
            .await
    }

    async fn update_slider_caption(&self, id: RowId, caption: &str) -> Result<bool> {
        let caption = caption.to_string();
        self.with_conn(move |conn| slider::update_caption(conn, id, &caption))
            .await
    }

    async fn slider_items(&self) -> Result<Vec<SliderItem>> {
        self.with_conn(|conn| slider::list_slider_items(conn)).await
    }

    async fn gallery_items(&self) -> Result<Vec<GalleryItem>> {
        self.with_conn(|conn| gallery::list_gallery_items(conn)).await
    }

    async fn site_content(&self) -> Result<Option<SiteContent>> {
        self.with_conn(|conn| site_content::get_site_content(conn))
            .await
    }

    async fn update_site_content(&self, content: &SiteContent) -> Result<Option<SiteContent>> {
        let content = content.clone();
        self.with_conn(move |conn| site_content::update_site_content(conn, &content))
            .await
    }
}
