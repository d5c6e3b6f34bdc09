// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Time-ordered report identifiers.
//!
//! A report ID is a zero-padded epoch-millisecond prefix followed by a
//! random UUID suffix. Lexicographic order of IDs therefore matches
//! creation order, and the creation time can be recovered from the ID
//! alone — no side table, which is what lets the status listing derive
//! creation times purely from directory names.

use chrono::Utc;
use uuid::Uuid;

/// Width of the zero-padded millisecond prefix. Enough for any timestamp
/// representable in an i64.
const TIME_PREFIX_WIDTH: usize = 20;

/// Generate a new report ID.
pub fn generate() -> String {
    format!(
        "{:0width$}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        width = TIME_PREFIX_WIDTH
    )
}

/// Extract the creation time in epoch milliseconds from a report ID.
///
/// Returns `None` if the ID does not carry a well-formed time prefix.
pub fn creation_time_millis(report_id: &str) -> Option<i64> {
    let (prefix, _) = report_id.split_once('-')?;
    if prefix.len() != TIME_PREFIX_WIDTH {
        return None;
    }
    prefix.parse().ok()
}

/// Extract the creation time in epoch seconds from a report ID.
pub fn creation_time_secs(report_id: &str) -> Option<i64> {
    creation_time_millis(report_id).map(|ms| ms / 1000)
}
