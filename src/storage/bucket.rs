//! Filesystem-backed object buckets.
//!
//! Objects live at `{root}/{bucket}/{path}` and are served from
//! `{public_base_url}/{bucket}/{path}`. Writes overwrite an existing object
//! at the same path. Nothing is ever deleted from a bucket.

use std::path::{Component, Path, PathBuf};

use memories_common::{Error, Result, StoredAsset};
use sha2::{Digest, Sha256};

/// Local object storage rooted at one directory.
#[derive(Debug, Clone)]
pub struct AssetBucket {
    root: PathBuf,
    public_base_url: String,
}

impl AssetBucket {
    /// Create a new `AssetBucket`.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory that holds one subdirectory per bucket
    /// * `public_base_url` - URL prefix objects are served under
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Write `data` to `bucket` at `path` and describe the stored object.
    pub async fn put(&self, bucket: &str, path: &str, data: &[u8]) -> Result<StoredAsset> {
        let file_path = self.object_path(bucket, path)?;

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::upload(path, format!("create {}: {e}", parent.display())))?;
        }

        tokio::fs::write(&file_path, data)
            .await
            .map_err(|e| Error::upload(path, format!("write {}: {e}", file_path.display())))?;

        tracing::debug!(bucket, path, size = data.len(), "stored object");

        Ok(StoredAsset {
            bucket: bucket.to_string(),
            path: path.to_string(),
            public_url: self.public_url(bucket, path),
            size: data.len() as u64,
            etag: compute_etag(data),
        })
    }

    /// Filesystem location of an object.
    ///
    /// Rejects paths that are absolute, empty or climb out of the bucket.
    pub fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf> {
        validate_relative(bucket, path)?;
        validate_relative(path, path)?;
        Ok(self.root.join(bucket).join(path))
    }

    /// Public URL of an object.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, bucket, path)
    }
}

fn validate_relative(segment: &str, path: &str) -> Result<()> {
    let candidate = Path::new(segment);
    let mut normal = 0;
    for component in candidate.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            _ => return Err(Error::upload(path, format!("invalid object path {segment:?}"))),
        }
    }
    if normal == 0 {
        return Err(Error::upload(path, "empty object path"));
    }
    Ok(())
}

/// Content tag for stored data.
///
/// Returns the first 16 hex characters of the SHA-256 digest.
pub fn compute_etag(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    hex::encode(&digest[..8]) // 8 bytes = 16 hex chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_deterministic() {
        assert_eq!(compute_etag(b"same"), compute_etag(b"same"));
        assert_ne!(compute_etag(b"one"), compute_etag(b"two"));
        assert_eq!(compute_etag(b"x").len(), 16);
    }

    #[test]
    fn public_url_trims_trailing_slash() {
        let bucket = AssetBucket::new(PathBuf::from("/srv"), "https://cdn.example.com/storage/");
        assert_eq!(
            bucket.public_url("images", "gallery/1_abc_a.jpg"),
            "https://cdn.example.com/storage/images/gallery/1_abc_a.jpg"
        );
    }

    #[test]
    fn object_path_rejects_escape() {
        let bucket = AssetBucket::new(PathBuf::from("/srv"), "http://x");
        assert!(bucket.object_path("images", "../secret").is_err());
        assert!(bucket.object_path("images", "/etc/passwd").is_err());
        assert!(bucket.object_path("images", "").is_err());
        assert!(bucket.object_path("..", "a.jpg").is_err());
        assert_eq!(
            bucket.object_path("images", "hero/a.jpg").unwrap(),
            PathBuf::from("/srv/images/hero/a.jpg")
        );
    }

    #[tokio::test]
    async fn put_writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = AssetBucket::new(dir.path().to_path_buf(), "http://localhost/storage");

        let stored = bucket.put("images", "slider/1_abc_a.jpg", b"first").await.unwrap();
        assert_eq!(stored.size, 5);
        assert_eq!(stored.public_url, "http://localhost/storage/images/slider/1_abc_a.jpg");

        let again = bucket.put("images", "slider/1_abc_a.jpg", b"second").await.unwrap();
        assert_ne!(stored.etag, again.etag);

        let on_disk = std::fs::read(dir.path().join("images/slider/1_abc_a.jpg")).unwrap();
        assert_eq!(on_disk, b"second");
    }
}
