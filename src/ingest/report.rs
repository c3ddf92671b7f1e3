//! Per-asset outcomes and the aggregate report of one ingestion batch.

use std::time::Duration;

use memories_common::{Collection, Error, RowId};
use serde::Serialize;

/// Why a single asset did not make it into its collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AssetFailure {
    #[error("upload failed: {message}")]
    Upload { message: String },

    #[error("upload timed out after {}s", .after.as_secs())]
    UploadTimedOut { after: Duration },

    /// The upload succeeded and `key` was consumed, but no row was written.
    #[error("insert at key {key} failed: {message}")]
    Insert { key: u32, message: String },

    #[error("insert at key {key} timed out after {}s", .after.as_secs())]
    InsertTimedOut { key: u32, after: Duration },
}

impl AssetFailure {
    /// The order key this failure consumed, if it got past the upload.
    pub fn consumed_key(&self) -> Option<u32> {
        match self {
            Self::Upload { .. } | Self::UploadTimedOut { .. } => None,
            Self::Insert { key, .. } | Self::InsertTimedOut { key, .. } => Some(*key),
        }
    }

    /// Convert to the workspace error for single-asset operations.
    pub fn into_error(self, collection: Collection, path: &str) -> Error {
        match self {
            Self::Upload { .. } | Self::UploadTimedOut { .. } => Error::upload(path, self),
            Self::Insert { .. } | Self::InsertTimedOut { .. } => Error::insert(collection, self),
        }
    }
}

/// What happened to one asset of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetOutcome {
    Added {
        filename: String,
        path: String,
        public_url: String,
        key: u32,
        id: RowId,
    },
    Failed {
        filename: String,
        path: String,
        failure: AssetFailure,
    },
}

impl AssetOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

/// Aggregate result of [`IngestionService::ingest`](super::IngestionService::ingest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub collection: Collection,
    /// Maximum key observed before the batch started.
    pub starting_key: u32,
    /// Last key consumed by the batch; equals `starting_key` when none was.
    pub last_key: u32,
    pub outcomes: Vec<AssetOutcome>,
    pub success_count: usize,
    pub fail_count: usize,
    /// Rows renumbered by an automatic repair after the batch.
    pub repaired: usize,
}

impl BatchReport {
    /// Report for a batch with no assets.
    pub fn empty(collection: Collection) -> Self {
        Self::from_outcomes(collection, 0, 0, Vec::new())
    }

    pub fn from_outcomes(
        collection: Collection,
        starting_key: u32,
        last_key: u32,
        outcomes: Vec<AssetOutcome>,
    ) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_added()).count();
        let fail_count = outcomes.len() - success_count;
        Self {
            collection,
            starting_key,
            last_key,
            outcomes,
            success_count,
            fail_count,
            repaired: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Keys of the rows this batch inserted, in input order.
    pub fn added_keys(&self) -> Vec<u32> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                AssetOutcome::Added { key, .. } => Some(*key),
                AssetOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "nothing to upload".to_string();
        }
        if self.success_count == 0 {
            return format!("failed to add {}", self.collection.noun(self.fail_count));
        }

        let mut summary = format!(
            "{} {} added",
            self.success_count,
            self.collection.noun(self.success_count)
        );
        if self.fail_count > 0 {
            summary.push_str(&format!(" ({} failed)", self.fail_count));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(key: u32) -> AssetOutcome {
        AssetOutcome::Added {
            filename: format!("{key}.jpg"),
            path: format!("gallery/{key}.jpg"),
            public_url: String::new(),
            key,
            id: RowId::new(),
        }
    }

    fn failed(failure: AssetFailure) -> AssetOutcome {
        AssetOutcome::Failed {
            filename: "x.jpg".into(),
            path: "gallery/x.jpg".into(),
            failure,
        }
    }

    #[test]
    fn counts_follow_outcomes() {
        let report = BatchReport::from_outcomes(
            Collection::Gallery,
            3,
            5,
            vec![
                added(4),
                failed(AssetFailure::Upload {
                    message: "boom".into(),
                }),
                added(5),
            ],
        );
        assert_eq!(report.success_count, 2);
        assert_eq!(report.fail_count, 1);
        assert_eq!(report.total(), 3);
        assert_eq!(report.added_keys(), vec![4, 5]);
        assert_eq!(report.summary(), "2 photos added (1 failed)");
    }

    #[test]
    fn summary_variants() {
        assert_eq!(
            BatchReport::empty(Collection::Slider).summary(),
            "nothing to upload"
        );

        let one = BatchReport::from_outcomes(Collection::Slider, 0, 1, vec![added(1)]);
        assert_eq!(one.summary(), "1 slide added");

        let none = BatchReport::from_outcomes(
            Collection::Slider,
            0,
            1,
            vec![
                failed(AssetFailure::Insert {
                    key: 1,
                    message: "nope".into(),
                }),
                failed(AssetFailure::UploadTimedOut {
                    after: Duration::from_secs(30),
                }),
            ],
        );
        assert_eq!(none.summary(), "failed to add slides");
    }

    #[test]
    fn only_insert_failures_consume_keys() {
        let upload = AssetFailure::Upload {
            message: "x".into(),
        };
        let insert = AssetFailure::InsertTimedOut {
            key: 7,
            after: Duration::from_secs(1),
        };
        assert_eq!(upload.consumed_key(), None);
        assert_eq!(insert.consumed_key(), Some(7));
    }

    #[test]
    fn failure_maps_to_workspace_error() {
        let err = AssetFailure::Upload {
            message: "disk full".into(),
        }
        .into_error(Collection::Gallery, "gallery/a.jpg");
        assert!(matches!(err, Error::UploadFailed { ref path, .. } if path == "gallery/a.jpg"));

        let err = AssetFailure::Insert {
            key: 2,
            message: "locked".into(),
        }
        .into_error(Collection::Slider, "slider/a.jpg");
        assert!(matches!(
            err,
            Error::InsertFailed {
                collection: Collection::Slider,
                ..
            }
        ));
    }
}
