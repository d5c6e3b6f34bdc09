// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Durable, marker-based report state tracking.
//!
//! Each report owns a directory named by its ID under the store's base
//! location. The directory accumulates artifacts in a fixed order:
//!
//! | Artifact | Written by | Meaning |
//! |----------|-----------|---------|
//! | `_START` | submission path | verbatim original request JSON |
//! | `reports/` | compute engine | output rows, one JSON record per line |
//! | `COUNT` | worker | total row count, decimal |
//! | `_SUCCESS` | worker | terminal: report completed |
//! | `_FAILURE` | worker | terminal: report failed, cause inside |
//!
//! A report's status is never stored as a value anywhere; it is a pure
//! projection of which terminal markers exist. That is what makes status
//! survive process restarts: the only source of truth is the marker set,
//! and every marker write is an atomic create-new, so a reader polling
//! between writes observes a legitimate prefix of the sequence, never a
//! torn state.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use runreport_store::{LocationRef, StoreError};

use crate::error::ReportError;
use crate::ids;

/// Marker holding the verbatim original request.
pub const START_FILE: &str = "_START";
/// Terminal marker: report generation completed.
pub const SUCCESS_FILE: &str = "_SUCCESS";
/// Terminal marker: report generation failed; holds the failure cause.
pub const FAILURE_FILE: &str = "_FAILURE";
/// Marker holding the total output row count.
pub const COUNT_FILE: &str = "COUNT";
/// Directory of output row files.
pub const REPORT_DIR: &str = "reports";
/// Name of the consolidated row file written by in-process compute engines.
pub const ROWS_FILE: &str = "report.json";

/// Status of a report, derived from marker presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    /// Report directory exists, no terminal marker yet.
    #[serde(rename = "RUNNING")]
    Running,
    /// Success marker exists.
    #[serde(rename = "COMPLETED")]
    Completed,
    /// Failure marker exists.
    #[serde(rename = "FAILED")]
    Failed,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Project a report status from terminal-marker presence.
///
/// Success wins over failure; both markers present is impossible in
/// practice because [`ReportStore::mark_completed`] and
/// [`ReportStore::mark_failed`] refuse to create a second terminal marker,
/// but the projection still answers deterministically for that state.
pub fn project_status(success_exists: bool, failure_exists: bool) -> ReportStatus {
    if success_exists {
        ReportStatus::Completed
    } else if failure_exists {
        ReportStatus::Failed
    } else {
        ReportStatus::Running
    }
}

/// Durable report artifact store over an [`ObjectLocation`] base.
///
/// [`ObjectLocation`]: runreport_store::ObjectLocation
#[derive(Clone)]
pub struct ReportStore {
    base: LocationRef,
}

impl ReportStore {
    /// Create a store rooted at the given base location.
    pub fn new(base: LocationRef) -> Self {
        Self { base }
    }

    /// Allocate a new time-ordered report ID.
    pub fn allocate_id(&self) -> String {
        ids::generate()
    }

    /// The directory location of a report.
    pub fn report_dir(&self, report_id: &str) -> LocationRef {
        self.base.append(report_id)
    }

    /// The output rows directory of a report.
    pub fn rows_dir(&self, report_id: &str) -> LocationRef {
        self.report_dir(report_id).append(REPORT_DIR)
    }

    /// Whether the report directory exists.
    pub async fn exists(&self, report_id: &str) -> Result<bool, ReportError> {
        Ok(self.report_dir(report_id).exists().await?)
    }

    /// Create the report directory.
    pub async fn create_report_dir(&self, report_id: &str) -> Result<(), ReportError> {
        self.report_dir(report_id).mkdirs().await?;
        debug!(report_id, "created report directory");
        Ok(())
    }

    /// Persist the verbatim original request JSON.
    ///
    /// Must be the first write of a report's lifetime; fails if a request
    /// was already written for this ID.
    pub async fn write_request(&self, report_id: &str, request_json: &str) -> Result<(), ReportError> {
        let start = self.report_dir(report_id).append(START_FILE);
        if !start.create_new().await? {
            return Err(ReportError::StorageError {
                operation: "write_request".to_string(),
                details: format!("request already written for report {report_id}"),
            });
        }
        start.write(request_json.as_bytes()).await?;
        debug!(report_id, "wrote original request");
        Ok(())
    }

    /// Read back the verbatim original request JSON.
    pub async fn read_request(&self, report_id: &str) -> Result<String, ReportError> {
        let bytes = self.report_dir(report_id).append(START_FILE).read().await?;
        String::from_utf8(bytes).map_err(|e| ReportError::CorruptReport {
            report_id: report_id.to_string(),
            details: format!("request marker is not valid UTF-8: {e}"),
        })
    }

    /// Persist the total output row count.
    pub async fn write_row_count(&self, report_id: &str, count: u64) -> Result<(), ReportError> {
        let location = self.report_dir(report_id).append(COUNT_FILE);
        location.create_new().await?;
        location.write(count.to_string().as_bytes()).await?;
        Ok(())
    }

    /// Read the total output row count.
    pub async fn read_row_count(&self, report_id: &str) -> Result<u64, ReportError> {
        let bytes = self.report_dir(report_id).append(COUNT_FILE).read().await?;
        String::from_utf8_lossy(&bytes)
            .trim()
            .parse()
            .map_err(|e| ReportError::CorruptReport {
                report_id: report_id.to_string(),
                details: format!("unreadable row count: {e}"),
            })
    }

    /// Persist the output rows, one JSON record per line.
    ///
    /// Rows are written exactly once per report and are immutable after
    /// that; a second write for the same report is an error.
    pub async fn write_rows(&self, report_id: &str, rows: &[String]) -> Result<(), ReportError> {
        let rows_dir = self.rows_dir(report_id);
        rows_dir.mkdirs().await?;
        let row_file = rows_dir.append(ROWS_FILE);
        if !row_file.create_new().await? {
            return Err(ReportError::StorageError {
                operation: "write_rows".to_string(),
                details: format!("rows already written for report {report_id}"),
            });
        }
        row_file.write(rows.join("\n").as_bytes()).await?;
        debug!(report_id, rows = rows.len(), "wrote output rows");
        Ok(())
    }

    /// Read output rows, skipping `offset` rows and returning up to `limit`.
    ///
    /// Only meaningful once the report is COMPLETED; callers gate on
    /// status. A completed report with no row file is a consistency fault.
    pub async fn read_rows(
        &self,
        report_id: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<String>, ReportError> {
        let rows_dir = self.rows_dir(report_id);
        // A single row file per report; the compute engine writes one
        // consolidated .json output.
        let row_file = rows_dir
            .list()
            .await?
            .into_iter()
            .find(|f| f.name().ends_with(".json"))
            .ok_or_else(|| ReportError::CorruptReport {
                report_id: report_id.to_string(),
                details: "no row files found".to_string(),
            })?;
        let bytes = row_file.read().await?;
        let content = String::from_utf8(bytes).map_err(|e| ReportError::CorruptReport {
            report_id: report_id.to_string(),
            details: format!("row file is not valid UTF-8: {e}"),
        })?;
        Ok(content
            .lines()
            .skip(offset as usize)
            .take(limit)
            .map(str::to_string)
            .collect())
    }

    /// Write the success marker. The report must still be RUNNING.
    pub async fn mark_completed(&self, report_id: &str) -> Result<(), ReportError> {
        self.mark_terminal(report_id, SUCCESS_FILE, None).await
    }

    /// Write the failure marker with the failure cause. The report must
    /// still be RUNNING.
    pub async fn mark_failed(&self, report_id: &str, cause: &str) -> Result<(), ReportError> {
        self.mark_terminal(report_id, FAILURE_FILE, Some(cause)).await
    }

    async fn mark_terminal(
        &self,
        report_id: &str,
        marker: &str,
        cause: Option<&str>,
    ) -> Result<(), ReportError> {
        let current = self.status(report_id).await?;
        if current != ReportStatus::Running {
            warn!(report_id, %current, marker, "refusing to overwrite terminal marker");
            return Err(ReportError::StorageError {
                operation: "mark_terminal".to_string(),
                details: format!("report {report_id} is already in terminal state {current}"),
            });
        }
        let location = self.report_dir(report_id).append(marker);
        if !location.create_new().await? {
            // Lost a race with another marker write for the same report.
            warn!(report_id, marker, "terminal marker already present");
            return Err(ReportError::StorageError {
                operation: "mark_terminal".to_string(),
                details: format!("terminal marker {marker} already exists for report {report_id}"),
            });
        }
        if let Some(cause) = cause {
            location.write(cause.as_bytes()).await?;
        }
        debug!(report_id, marker, "wrote terminal marker");
        Ok(())
    }

    /// Current status of a report, derived from marker presence.
    pub async fn status(&self, report_id: &str) -> Result<ReportStatus, ReportError> {
        Self::status_of(&self.report_dir(report_id)).await
    }

    /// Status projection for a report directory location.
    pub async fn status_of(report_dir: &LocationRef) -> Result<ReportStatus, ReportError> {
        let success = report_dir.append(SUCCESS_FILE).exists().await?;
        let failure = report_dir.append(FAILURE_FILE).exists().await?;
        Ok(project_status(success, failure))
    }

    /// List all report directories, ascending by name.
    ///
    /// IDs embed their creation time as a sortable prefix, so name order
    /// is creation order. A base location that does not exist yet simply
    /// has no reports.
    pub async fn list_reports(&self) -> Result<Vec<LocationRef>, ReportError> {
        match self.base.list().await {
            Ok(dirs) => Ok(dirs),
            Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
