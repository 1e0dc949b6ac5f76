//! Timestamp helpers
//!
//! All timestamps in the dispatch core are Unix epoch milliseconds (`u64`).

use std::time::{SystemTime, UNIX_EPOCH};

/// Get the current timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
