//! Renumbering of collection order keys.
//!
//! Concurrent batches may read the same maximum key and write duplicates.
//! [`repair_order`] restores the dense sequence `1..=n` without changing the
//! display order (key, then insertion order).

use std::collections::HashSet;

use memories_common::{Collection, OrderKey, Result};
use tracing::{debug, info};

use crate::store::ContentStore;

/// True if any two rows of `keys` share a key.
pub fn has_duplicate_keys(keys: &[OrderKey]) -> bool {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter().any(|k| !seen.insert(k.key))
}

/// The `(row, new key)` pairs needed to make `keys` dense. `keys` must be in
/// display order.
pub fn plan_renumbering(keys: &[OrderKey]) -> Vec<OrderKey> {
    keys.iter()
        .zip(1u32..)
        .filter(|(k, want)| k.key != *want)
        .map(|(k, want)| OrderKey { id: k.id, key: want })
        .collect()
}

/// Rewrite the keys of `collection` to `1..=n` in display order.
///
/// Only rows whose key changes are written. Returns the number of rows
/// rewritten; rows deleted while the repair runs are skipped.
pub async fn repair_order(store: &dyn ContentStore, collection: Collection) -> Result<usize> {
    let keys = store.order_keys(collection).await?;
    let plan = plan_renumbering(&keys);
    if plan.is_empty() {
        debug!(%collection, rows = keys.len(), "Order keys already dense");
        return Ok(0);
    }

    let mut rewritten = 0;
    for change in &plan {
        if store.set_order_key(collection, change.id, change.key).await? {
            rewritten += 1;
        }
    }

    info!(%collection, rows = keys.len(), rewritten, "Repaired order keys");
    Ok(rewritten)
}
