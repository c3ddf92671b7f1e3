//! In-process content store with fault injection.
//!
//! Used by tests and dry runs. Failures and latency can be injected per step
//! so batch behaviour under partial failure and concurrency can be exercised
//! without a database or a bucket directory.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memories_common::{
    Collection, Error, GalleryItem, NewRow, OrderKey, Result, RowId, Session, SessionId,
    SiteContent, SiteContentId, SliderItem, StoredAsset, UserId,
};
use parking_lot::Mutex;

use super::ContentStore;
use crate::storage::compute_etag;

#[derive(Debug, Clone)]
struct MemoryRow {
    id: RowId,
    seq: u64,
    key: u32,
    image_url: String,
    caption: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Faults {
    upload_markers: Vec<String>,
    fail_inserts: bool,
    fail_deletes: bool,
    upload_latency: Option<Duration>,
    insert_latency: Option<Duration>,
}

#[derive(Default)]
struct Counters {
    uploads: usize,
    inserts: usize,
    delete_requests: usize,
}

struct State {
    session: Option<Session>,
    slider: Vec<MemoryRow>,
    gallery: Vec<MemoryRow>,
    objects: HashMap<String, StoredAsset>,
    site_content: Option<SiteContent>,
    next_seq: u64,
    faults: Faults,
    counters: Counters,
}

impl State {
    fn rows(&self, collection: Collection) -> &Vec<MemoryRow> {
        match collection {
            Collection::Slider => &self.slider,
            Collection::Gallery => &self.gallery,
        }
    }

    fn rows_mut(&mut self, collection: Collection) -> &mut Vec<MemoryRow> {
        match collection {
            Collection::Slider => &mut self.slider,
            Collection::Gallery => &mut self.gallery,
        }
    }

    /// Rows in display order: key, then insertion sequence.
    fn sorted(&self, collection: Collection) -> Vec<MemoryRow> {
        let mut rows = self.rows(collection).clone();
        rows.sort_by_key(|r| (r.key, r.seq));
        rows
    }
}

/// Content store holding everything in memory.
pub struct MemoryContentStore {
    state: Mutex<State>,
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContentStore {
    /// A signed-out store with a seeded site content row and empty collections.
    pub fn new() -> Self {
        let site_content = SiteContent {
            id: SiteContentId::new(),
            couple_name: "Our Story".into(),
            start_date: String::new(),
            about_text: String::new(),
            letter_text: String::new(),
            hero_subtitle: String::new(),
            hero_image_url: String::new(),
            hero_image_position: 50,
            updated_at: Utc::now(),
        };

        Self {
            state: Mutex::new(State {
                session: None,
                slider: Vec::new(),
                gallery: Vec::new(),
                objects: HashMap::new(),
                site_content: Some(site_content),
                next_seq: 0,
                faults: Faults::default(),
                counters: Counters::default(),
            }),
        }
    }

    /// Start with an active session.
    pub fn signed_in(self) -> Self {
        self.sign_in();
        self
    }

    pub fn sign_in(&self) {
        self.state.lock().session = Some(Session {
            id: SessionId::new(),
            user_id: UserId::new(),
            token: "memory-session".into(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        });
    }

    pub fn sign_out(&self) {
        self.state.lock().session = None;
    }

    /// Fail every upload whose object path contains `marker`.
    pub fn fail_uploads_containing(&self, marker: impl Into<String>) {
        self.state.lock().faults.upload_markers.push(marker.into());
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.state.lock().faults.fail_inserts = fail;
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.state.lock().faults.fail_deletes = fail;
    }

    /// Delay applied before every upload completes.
    pub fn set_upload_latency(&self, latency: Duration) {
        self.state.lock().faults.upload_latency = Some(latency);
    }

    /// Delay applied before every insert completes.
    pub fn set_insert_latency(&self, latency: Duration) {
        self.state.lock().faults.insert_latency = Some(latency);
    }

    /// Number of upload requests received, including failed ones.
    pub fn upload_count(&self) -> usize {
        self.state.lock().counters.uploads
    }

    /// Number of insert requests received, including failed ones.
    pub fn insert_count(&self) -> usize {
        self.state.lock().counters.inserts
    }

    pub fn delete_request_count(&self) -> usize {
        self.state.lock().counters.delete_requests
    }

    /// Paths of every stored object, sorted.
    pub fn stored_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .state
            .lock()
            .objects
            .values()
            .map(|o| o.path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Keys of `collection` in display order.
    pub fn keys(&self, collection: Collection) -> Vec<u32> {
        self.state
            .lock()
            .sorted(collection)
            .iter()
            .map(|r| r.key)
            .collect()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn current_session(&self) -> Result<Option<Session>> {
        let state = self.state.lock();
        Ok(state
            .session
            .clone()
            .filter(|s| !s.is_expired_at(Utc::now())))
    }

    async fn max_order_key(&self, collection: Collection) -> Result<u32> {
        let state = self.state.lock();
        Ok(state
            .rows(collection)
            .iter()
            .map(|r| r.key)
            .max()
            .unwrap_or(0))
    }

    async fn upload_asset(&self, bucket: &str, path: &str, bytes: &[u8]) -> Result<StoredAsset> {
        let latency = {
            let mut state = self.state.lock();
            state.counters.uploads += 1;
            state.faults.upload_latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        if state
            .faults
            .upload_markers
            .iter()
            .any(|m| path.contains(m.as_str()))
        {
            return Err(Error::upload(path, "injected upload failure"));
        }

        let stored = StoredAsset {
            bucket: bucket.to_string(),
            path: path.to_string(),
            public_url: format!("memory://{bucket}/{path}"),
            size: bytes.len() as u64,
            etag: compute_etag(bytes),
        };
        state
            .objects
            .insert(format!("{bucket}/{path}"), stored.clone());
        Ok(stored)
    }

    async fn insert_row(&self, row: NewRow) -> Result<RowId> {
        let latency = {
            let mut state = self.state.lock();
            state.counters.inserts += 1;
            state.faults.insert_latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        let collection = row.collection();
        if state.faults.fail_inserts {
            return Err(Error::insert(collection, "injected insert failure"));
        }

        let key = row.order_key();
        let (image_url, caption) = match row {
            NewRow::Slider {
                image_url, caption, ..
            } => (image_url, caption),
            NewRow::Gallery { image_url, .. } => (image_url, String::new()),
        };
        let id = RowId::new();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.rows_mut(collection).push(MemoryRow {
            id,
            seq,
            key,
            image_url,
            caption,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn delete_rows(&self, collection: Collection, ids: &[RowId]) -> Result<usize> {
        let mut state = self.state.lock();
        state.counters.delete_requests += 1;
        if state.faults.fail_deletes {
            return Err(Error::database("injected delete failure"));
        }
        let rows = state.rows_mut(collection);
        let before = rows.len();
        rows.retain(|r| !ids.contains(&r.id));
        Ok(before - rows.len())
    }

    async fn order_keys(&self, collection: Collection) -> Result<Vec<OrderKey>> {
        let state = self.state.lock();
        Ok(state
            .sorted(collection)
            .into_iter()
            .map(|r| OrderKey { id: r.id, key: r.key })
            .collect())
    }

    async fn set_order_key(&self, collection: Collection, id: RowId, key: u32) -> Result<bool> {
        let mut state = self.state.lock();
        match state.rows_mut(collection).iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.key = key;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_slider_image(&self, position: u32, image_url: &str) -> Result<usize> {
        let mut state = self.state.lock();
        let mut changed = 0;
        for row in state.slider.iter_mut().filter(|r| r.key == position) {
            row.image_url = image_url.to_string();
            changed += 1;
        }
        Ok(changed)
    }

    async fn update_slider_caption(&self, id: RowId, caption: &str) -> Result<bool> {
        let mut state = self.state.lock();
        match state.slider.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.caption = caption.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn slider_items(&self) -> Result<Vec<SliderItem>> {
        let state = self.state.lock();
        Ok(state
            .sorted(Collection::Slider)
            .into_iter()
            .map(|r| SliderItem {
                id: r.id,
                position: r.key,
                image_url: r.image_url,
                caption: r.caption,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn gallery_items(&self) -> Result<Vec<GalleryItem>> {
        let state = self.state.lock();
        Ok(state
            .sorted(Collection::Gallery)
            .into_iter()
            .map(|r| GalleryItem {
                id: r.id,
                image_url: r.image_url,
                order: r.key,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn site_content(&self) -> Result<Option<SiteContent>> {
        Ok(self.state.lock().site_content.clone())
    }

    async fn update_site_content(&self, content: &SiteContent) -> Result<Option<SiteContent>> {
        let mut state = self.state.lock();
        match state.site_content.as_mut() {
            Some(existing) if existing.id == content.id => {
                *existing = content.clone();
                existing.updated_at = Utc::now();
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_toggles() {
        let store = MemoryContentStore::new();
        assert!(store.current_session().await.unwrap().is_none());
        store.sign_in();
        assert!(store.current_session().await.unwrap().is_some());
        store.sign_out();
        assert!(store.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ties_list_in_insertion_order() {
        let store = MemoryContentStore::new();
        let first = store
            .insert_row(NewRow::for_collection(Collection::Gallery, "a".into(), 1))
            .await
            .unwrap();
        let second = store
            .insert_row(NewRow::for_collection(Collection::Gallery, "b".into(), 1))
            .await
            .unwrap();

        let keys = store.order_keys(Collection::Gallery).await.unwrap();
        assert_eq!(keys[0].id, first);
        assert_eq!(keys[1].id, second);
        assert_eq!(store.max_order_key(Collection::Gallery).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn injected_upload_failure_matches_path() {
        let store = MemoryContentStore::new();
        store.fail_uploads_containing("bad");

        assert!(store.upload_asset("images", "gallery/ok.jpg", b"x").await.is_ok());
        let err = store
            .upload_asset("images", "gallery/bad.jpg", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UploadFailed { .. }));
        assert_eq!(store.upload_count(), 2);
        assert_eq!(store.stored_paths(), vec!["gallery/ok.jpg".to_string()]);
    }

    #[tokio::test]
    async fn delete_ignores_unknown_ids() {
        let store = MemoryContentStore::new();
        let id = store
            .insert_row(NewRow::for_collection(Collection::Slider, "a".into(), 1))
            .await
            .unwrap();

        let deleted = store
            .delete_rows(Collection::Slider, &[id, RowId::new()])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(store.slider_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn slider_image_update_targets_position() {
        let store = MemoryContentStore::new();
        store
            .insert_row(NewRow::for_collection(Collection::Slider, "old".into(), 2))
            .await
            .unwrap();

        assert_eq!(store.update_slider_image(2, "new").await.unwrap(), 1);
        assert_eq!(store.update_slider_image(7, "new").await.unwrap(), 0);
        let items = store.slider_items().await.unwrap();
        assert_eq!(items[0].image_url, "new");
        assert_eq!(items[0].caption, "Slide 2");
    }
}
