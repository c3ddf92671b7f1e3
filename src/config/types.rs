use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the database, the bucket tree and the session file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Bucket that slider, gallery and hero images are written to
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Prefix used to build public URLs for stored objects
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_bucket() -> String {
    "images".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/storage".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bucket: default_bucket(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("memories.db")
    }

    pub fn bucket_root(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.token")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Pause between consecutive assets of one batch (default: 100)
    #[serde(default = "default_inter_asset_delay")]
    pub inter_asset_delay_ms: u64,

    /// Upper bound for each store call made for one asset (default: 30)
    #[serde(default = "default_asset_timeout")]
    pub asset_timeout_secs: u64,

    /// Renumber a collection after a batch leaves duplicate keys behind
    #[serde(default)]
    pub auto_repair: bool,
}

fn default_inter_asset_delay() -> u64 {
    100
}

fn default_asset_timeout() -> u64 {
    30
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            inter_asset_delay_ms: default_inter_asset_delay(),
            asset_timeout_secs: default_asset_timeout(),
            auto_repair: false,
        }
    }
}

impl IngestConfig {
    pub fn inter_asset_delay(&self) -> Duration {
        Duration::from_millis(self.inter_asset_delay_ms)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Session lifetime in hours (default: 24)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_hours: u64,
}

fn default_session_timeout() -> u64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_timeout_hours: default_session_timeout(),
        }
    }
}
