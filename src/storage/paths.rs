//! Unique object path generation.
//!
//! Paths look like `{prefix}/{millis}_{token}_{filename}`. The millisecond
//! stamp is strictly increasing per generator and the random token separates
//! uploads from different processes that land on the same millisecond.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random token embedded in each path.
const TOKEN_LEN: usize = 6;

/// Filename used when sanitizing leaves nothing behind.
const FALLBACK_NAME: &str = "asset";

/// Generates collision-free object paths.
#[derive(Debug, Default)]
pub struct PathGenerator {
    last_millis: AtomicI64,
}

impl PathGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh path for `filename` under `prefix`.
    pub fn generate(&self, prefix: &str, filename: &str) -> String {
        format!(
            "{}/{}_{}_{}",
            prefix,
            self.next_millis(),
            random_token(),
            sanitize_filename(filename)
        )
    }

    /// Wall-clock milliseconds, bumped past the previous value when the clock
    /// has not advanced (or went backwards).
    fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_millis.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last_millis
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Reduce a client-supplied filename to a single safe path segment.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
