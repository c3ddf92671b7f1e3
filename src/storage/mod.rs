//! Object storage for uploaded images.
//!
//! This module provides the filesystem bucket that backs the local content
//! store and the generator for unique object paths used by every upload.

mod bucket;
mod paths;

pub use bucket::{compute_etag, AssetBucket};
pub use paths::{sanitize_filename, PathGenerator};
