//! The ordered asset ingestion service.
//!
//! [`IngestionService`] uploads assets into the bucket and appends rows to the
//! slider or gallery collection. Order keys come from a counter seeded with
//! the collection's maximum key, read once per batch. Assets are processed
//! one at a time with a pause between them; a failed asset is recorded in
//! the [`BatchReport`] and the batch moves on.
//!
//! The same service carries the admin edits that need a session: replacing a
//! slide or the hero image, captions, bulk deletes, repairs and site text.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use memories_common::{
    Asset, Collection, Error, GalleryItem, NewRow, Result, RowId, Session, SiteContent,
    SiteContentUpdate, SliderItem, StoredAsset,
};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::repair::{self, has_duplicate_keys};
use super::report::{AssetFailure, AssetOutcome, BatchReport};
use crate::config::IngestConfig;
use crate::storage::PathGenerator;
use crate::store::ContentStore;

/// Path prefix for hero images.
const HERO_PREFIX: &str = "hero";

/// Highest accepted hero focal point, in percent.
const MAX_HERO_POSITION: u8 = 100;

/// Uploads assets and maintains the ordered collections.
pub struct IngestionService {
    store: Arc<dyn ContentStore>,
    paths: PathGenerator,
    bucket: String,
    config: IngestConfig,
}

impl IngestionService {
    /// Create a service writing objects to `bucket` through `store`.
    pub fn new(
        store: Arc<dyn ContentStore>,
        bucket: impl Into<String>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            paths: PathGenerator::new(),
            bucket: bucket.into(),
            config,
        }
    }

    async fn require_session(&self) -> Result<Session> {
        self.store
            .current_session()
            .await?
            .ok_or_else(|| Error::Unauthorized("sign in to modify content".into()))
    }

    // -----------------------------------------------------------------------
    // Batch ingestion
    // -----------------------------------------------------------------------

    /// Upload `assets` in order and append one row per successful upload.
    ///
    /// An empty batch returns a zero report without contacting the store.
    /// Without a session the batch fails with [`Error::Unauthorized`] before
    /// anything is uploaded. Per-asset failures never abort the batch.
    pub async fn ingest(&self, assets: Vec<Asset>, collection: Collection) -> Result<BatchReport> {
        if assets.is_empty() {
            return Ok(BatchReport::empty(collection));
        }

        let session = self.require_session().await?;
        let starting_key = self.store.max_order_key(collection).await?;
        info!(
            %collection,
            assets = assets.len(),
            starting_key,
            user_id = %session.user_id,
            "Starting ingestion batch"
        );

        let delay = self.config.inter_asset_delay();
        let mut counter = starting_key;
        let mut outcomes = Vec::with_capacity(assets.len());

        for (index, asset) in assets.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                sleep(delay).await;
            }
            let outcome = self.process_asset(asset, collection, &mut counter).await;
            outcomes.push(outcome);
        }

        let mut report = BatchReport::from_outcomes(collection, starting_key, counter, outcomes);
        if self.config.auto_repair && report.success_count > 0 {
            report.repaired = self.repair_if_duplicated(collection).await;
        }

        info!(
            %collection,
            success = report.success_count,
            failed = report.fail_count,
            last_key = report.last_key,
            "{}",
            report.summary()
        );
        Ok(report)
    }

    /// Upload one asset and, if that worked, insert its row at the next key.
    async fn process_asset(
        &self,
        asset: &Asset,
        collection: Collection,
        counter: &mut u32,
    ) -> AssetOutcome {
        let path = self.paths.generate(&collection.to_string(), &asset.filename);

        let stored = match self.upload(&path, &asset.bytes).await {
            Ok(stored) => stored,
            Err(failure) => {
                warn!(
                    %collection,
                    filename = %asset.filename,
                    %path,
                    %failure,
                    "Asset upload failed"
                );
                return AssetOutcome::Failed {
                    filename: asset.filename.clone(),
                    path,
                    failure,
                };
            }
        };

        *counter += 1;
        let key = *counter;
        let row = NewRow::for_collection(collection, stored.public_url.clone(), key);

        let inserted = self
            .bounded(
                self.store.insert_row(row),
                |after| AssetFailure::InsertTimedOut { key, after },
                |e| AssetFailure::Insert {
                    key,
                    message: failure_message(e),
                },
            )
            .await;

        match inserted {
            Ok(id) => {
                debug!(%collection, filename = %asset.filename, key, row_id = %id, "Asset added");
                AssetOutcome::Added {
                    filename: asset.filename.clone(),
                    path,
                    public_url: stored.public_url,
                    key,
                    id,
                }
            }
            Err(failure) => {
                warn!(%collection, filename = %asset.filename, key, %failure, "Row insert failed");
                AssetOutcome::Failed {
                    filename: asset.filename.clone(),
                    path,
                    failure,
                }
            }
        }
    }

    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
    ) -> std::result::Result<StoredAsset, AssetFailure> {
        self.bounded(
            self.store.upload_asset(&self.bucket, path, bytes),
            |after| AssetFailure::UploadTimedOut { after },
            |e| AssetFailure::Upload {
                message: failure_message(e),
            },
        )
        .await
    }

    /// Run one store call under the per-asset timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T>>,
        on_timeout: impl FnOnce(Duration) -> AssetFailure,
        on_error: impl FnOnce(Error) -> AssetFailure,
    ) -> std::result::Result<T, AssetFailure> {
        let limit = self.config.asset_timeout();
        match timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(on_error(e)),
            Err(_) => Err(on_timeout(limit)),
        }
    }

    async fn repair_if_duplicated(&self, collection: Collection) -> usize {
        let result: Result<usize> = async {
            let keys = self.store.order_keys(collection).await?;
            if !has_duplicate_keys(&keys) {
                return Ok(0);
            }
            warn!(%collection, "Duplicate order keys after batch, repairing");
            repair::repair_order(self.store.as_ref(), collection).await
        }
        .await;

        result.unwrap_or_else(|e| {
            warn!(%collection, error = %e, "Automatic order repair failed");
            0
        })
    }

    // -----------------------------------------------------------------------
    // Single-asset variants
    // -----------------------------------------------------------------------

    /// Append one image to the gallery and return its order key.
    pub async fn append_gallery_image(&self, asset: Asset) -> Result<u32> {
        let report = self.ingest(vec![asset], Collection::Gallery).await?;
        match report.outcomes.into_iter().next() {
            Some(AssetOutcome::Added { key, .. }) => Ok(key),
            Some(AssetOutcome::Failed { path, failure, .. }) => {
                Err(failure.into_error(Collection::Gallery, &path))
            }
            None => Err(Error::Internal("single-asset batch produced no outcome".into())),
        }
    }

    /// Upload a new image for the slide at `position`, keeping its position and caption.
    pub async fn replace_slider_image(&self, position: u32, asset: Asset) -> Result<StoredAsset> {
        self.require_session().await?;

        let path = self
            .paths
            .generate(&Collection::Slider.to_string(), &asset.filename);
        let stored = self
            .upload(&path, &asset.bytes)
            .await
            .map_err(|f| f.into_error(Collection::Slider, &path))?;

        let changed = self
            .store
            .update_slider_image(position, &stored.public_url)
            .await?;
        if changed == 0 {
            return Err(Error::not_found("slider item", format!("position {position}")));
        }

        info!(position, path = %stored.path, "Replaced slider image");
        Ok(stored)
    }

    /// Upload a new hero image and point the site content at it.
    pub async fn replace_hero_image(&self, asset: Asset) -> Result<SiteContent> {
        self.require_session().await?;

        let path = self.paths.generate(HERO_PREFIX, &asset.filename);
        let stored = self.upload(&path, &asset.bytes).await.map_err(|f| match f {
            AssetFailure::Upload { message } => Error::upload(&path, message),
            other => Error::upload(&path, other),
        })?;

        let updated = self
            .apply_site_content(SiteContentUpdate {
                hero_image_url: Some(stored.public_url.clone()),
                ..Default::default()
            })
            .await?;

        info!(path = %stored.path, "Replaced hero image");
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Row edits
    // -----------------------------------------------------------------------

    /// Change the caption of one slide. Nothing else about the slide changes.
    pub async fn update_slider_caption(&self, id: RowId, caption: &str) -> Result<()> {
        self.require_session().await?;
        if !self.store.update_slider_caption(id, caption).await? {
            return Err(Error::not_found("slider item", id));
        }
        debug!(row_id = %id, "Updated slider caption");
        Ok(())
    }

    /// Delete every listed row of `collection` in a single store request.
    ///
    /// Stored objects are left in the bucket. Unknown ids are ignored. Any
    /// store failure is reported as [`Error::BulkDeleteFailed`] and no row
    /// counts as deleted.
    pub async fn delete_items(&self, collection: Collection, ids: &[RowId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.require_session().await?;

        let deleted = self
            .store
            .delete_rows(collection, ids)
            .await
            .map_err(|e| Error::BulkDeleteFailed(format!("{collection}: {e}")))?;

        info!(%collection, requested = ids.len(), deleted, "Deleted rows");
        Ok(deleted)
    }

    pub async fn delete_item(&self, collection: Collection, id: RowId) -> Result<usize> {
        self.delete_items(collection, &[id]).await
    }

    /// Renumber `collection` to dense keys. See [`repair::repair_order`].
    pub async fn repair_order(&self, collection: Collection) -> Result<usize> {
        self.require_session().await?;
        repair::repair_order(self.store.as_ref(), collection).await
    }

    // -----------------------------------------------------------------------
    // Site content and reads
    // -----------------------------------------------------------------------

    /// Apply a partial update to the site content row.
    pub async fn update_site_content(&self, update: SiteContentUpdate) -> Result<SiteContent> {
        self.require_session().await?;
        if update.is_empty() {
            return Err(Error::Validation("no site content fields to update".into()));
        }
        if let Some(position) = update.hero_image_position {
            if position > MAX_HERO_POSITION {
                return Err(Error::Validation(format!(
                    "hero image position must be between 0 and {MAX_HERO_POSITION}, got {position}"
                )));
            }
        }
        self.apply_site_content(update).await
    }

    async fn apply_site_content(&self, update: SiteContentUpdate) -> Result<SiteContent> {
        let mut content = self.site_content().await?;
        let id = content.id;
        update.apply_to(&mut content);
        self.store
            .update_site_content(&content)
            .await?
            .ok_or_else(|| Error::not_found("site content", id))
    }

    pub async fn site_content(&self) -> Result<SiteContent> {
        self.store
            .site_content()
            .await?
            .ok_or_else(|| Error::not_found("site content", "singleton"))
    }

    pub async fn slider_items(&self) -> Result<Vec<SliderItem>> {
        self.store.slider_items().await
    }

    pub async fn gallery_items(&self) -> Result<Vec<GalleryItem>> {
        self.store.gallery_items().await
    }
}

/// The message of a store error without the variant prefix the step already implies.
fn failure_message(err: Error) -> String {
    match err {
        Error::UploadFailed { message, .. } | Error::InsertFailed { message, .. } => message,
        other => other.to_string(),
    }
}
