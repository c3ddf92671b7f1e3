//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires an in-memory database, a bucket in a
//! temporary directory and a [`LocalContentStore`] into an
//! [`IngestionService`], plus helpers for signing in and building assets.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use memories::auth::AuthService;
use memories::config::{AuthConfig, IngestConfig};
use memories::ingest::IngestionService;
use memories::storage::AssetBucket;
use memories::store::LocalContentStore;
use memories_common::{Asset, Session};
use memories_db::pool::{init_memory_pool, DbPool};
use tempfile::TempDir;

pub const BUCKET: &str = "images";
pub const PUBLIC_BASE_URL: &str = "http://localhost:8080/storage";

/// Test harness around a [`LocalContentStore`] backed by an in-memory database.
pub struct TestHarness {
    pub db: DbPool,
    pub store: Arc<LocalContentStore>,
    pub service: IngestionService,
    pub auth: AuthService,
    bucket_dir: TempDir,
}

impl TestHarness {
    /// Create a signed-out harness without inter-asset delay.
    pub fn new() -> Self {
        Self::with_config(IngestConfig {
            inter_asset_delay_ms: 0,
            ..IngestConfig::default()
        })
    }

    /// Create a signed-out harness with a custom ingestion configuration.
    pub fn with_config(config: IngestConfig) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let bucket_dir = tempfile::tempdir().expect("failed to create bucket dir");
        let bucket = AssetBucket::new(bucket_dir.path().to_path_buf(), PUBLIC_BASE_URL);
        let store = Arc::new(LocalContentStore::new(db.clone(), bucket));
        let service = IngestionService::new(store.clone(), BUCKET, config);
        let auth = AuthService::new(db.clone(), AuthConfig::default()).with_cost(4);

        Self {
            db,
            store,
            service,
            auth,
            bucket_dir,
        }
    }

    /// Create an admin account, log in and act under the new session.
    pub fn sign_in(&self) -> Session {
        self.auth
            .sign_up("admin@example.com", "correct horse")
            .expect("failed to sign up");
        let session = self
            .auth
            .login("admin@example.com", "correct horse")
            .expect("failed to log in");
        self.store.set_session_token(Some(session.token.clone()));
        session
    }

    pub fn signed_in() -> Self {
        let harness = Self::new();
        harness.sign_in();
        harness
    }

    /// Root of the bucket tree on disk.
    pub fn bucket_root(&self) -> &Path {
        self.bucket_dir.path()
    }

    /// Filesystem location of an object at `path` in the test bucket.
    pub fn object_file(&self, path: &str) -> PathBuf {
        self.bucket_dir.path().join(BUCKET).join(path)
    }
}

/// Assets named `names`, each holding its own name as content.
pub fn assets(names: &[&str]) -> Vec<Asset> {
    names
        .iter()
        .map(|n| Asset::new(*n, n.as_bytes().to_vec()))
        .collect()
}
