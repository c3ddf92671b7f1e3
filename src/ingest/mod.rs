//! Ordered asset ingestion.
//!
//! - [`service`]: the [`IngestionService`] batch uploader and admin edits.
//! - [`report`]: per-asset outcomes and the [`BatchReport`] summary.
//! - [`repair`]: renumbering of duplicated or sparse order keys.

pub mod repair;
pub mod report;
pub mod service;

pub use repair::{has_duplicate_keys, repair_order};
pub use report::{AssetFailure, AssetOutcome, BatchReport};
pub use service::IngestionService;
