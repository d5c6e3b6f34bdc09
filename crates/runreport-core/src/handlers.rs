// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Report operation handlers.
//!
//! Transport-agnostic entry points for the four report operations:
//! submit, list, status, and row retrieval. An outer surface (HTTP or
//! otherwise) decodes its own envelope, calls these, and maps
//! [`ReportError`] to its wire format via
//! [`error_code`](ReportError::error_code) and
//! [`http_status`](ReportError::http_status).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use runreport_store::LocationRef;

use crate::error::{ReportError, Result};
use crate::ids;
use crate::request::ReportRequest;
use crate::runner::{self, ComputeEngine};
use crate::store::{ReportStatus, ReportStore};

/// Default upper bound for a single read window, reports and rows alike.
pub const DEFAULT_MAX_READ_LIMIT: i64 = 10_000;

/// Shared state for report handlers.
pub struct ReportHandlerState {
    /// Durable report artifact store.
    pub store: ReportStore,
    /// Base location of the run-meta partitions.
    pub meta_base: LocationRef,
    /// Compute engine that materializes report rows.
    pub engine: Arc<dyn ComputeEngine>,
    /// Upper bound for a single read window.
    pub max_read_limit: i64,
}

impl std::fmt::Debug for ReportHandlerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportHandlerState")
            .field("meta_base", &self.meta_base.uri())
            .field("max_read_limit", &self.max_read_limit)
            .finish_non_exhaustive()
    }
}

/// Response to a successful report submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReportResponse {
    /// The ID of the accepted report.
    pub id: String,
}

/// Status summary of one report in a listing.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatusInfo {
    /// The report ID.
    pub id: String,
    /// Creation time in epoch seconds, derived from the ID.
    pub creation_time: i64,
    /// Current status.
    pub status: ReportStatus,
}

/// One page of the report listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportList {
    /// The requested offset.
    pub offset: i64,
    /// The requested limit.
    pub limit: i64,
    /// Total number of reports, independent of the window.
    pub total: u64,
    /// The reports in the window, ascending by creation time.
    pub reports: Vec<ReportStatusInfo>,
}

/// Full generation info for a single report.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGenerationInfo {
    /// Creation time in epoch seconds, derived from the ID.
    pub creation_time: i64,
    /// Current status.
    pub status: ReportStatus,
    /// The verbatim original request JSON.
    pub request: String,
}

/// One page of report rows.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportContent {
    /// The requested offset.
    pub offset: i64,
    /// The requested limit.
    pub limit: i64,
    /// Total row count from the durable count marker, independent of the
    /// window.
    pub total: u64,
    /// The rows in the window, one JSON record each.
    pub rows: Vec<String>,
}

/// Submit a report generation request.
///
/// Decodes and validates the body, persists it durably, and only then
/// dispatches the asynchronous worker; a returned ID therefore always
/// refers to a report that will survive a crash. Validation accumulates
/// every violation rather than stopping at the first.
#[instrument(skip(state, body))]
pub async fn handle_submit_report(
    state: &ReportHandlerState,
    body: &str,
) -> Result<SubmitReportResponse> {
    let request: ReportRequest = serde_json::from_str(body)?;
    let errors = request.validate();
    if !errors.is_empty() {
        return Err(ReportError::InvalidRequest { errors });
    }

    let report_id = state.store.allocate_id();
    state.store.create_report_dir(&report_id).await?;
    state.store.write_request(&report_id, body).await?;
    runner::spawn_report_generation(
        state.store.clone(),
        state.meta_base.clone(),
        state.engine.clone(),
        report_id.clone(),
        request,
    );
    info!(%report_id, "report generation dispatched");
    Ok(SubmitReportResponse { id: report_id })
}

/// List report statuses, paginated, ascending by creation time.
#[instrument(skip(state))]
pub async fn handle_list_reports(
    state: &ReportHandlerState,
    offset: i64,
    limit: i64,
) -> Result<ReportList> {
    validate_window(offset, limit, state.max_read_limit)?;

    let dirs = state.store.list_reports().await?;
    let total = dirs.len() as u64;
    let mut reports = Vec::new();
    for dir in dirs.into_iter().skip(offset as usize).take(limit as usize) {
        let id = dir.name();
        let status = ReportStore::status_of(&dir).await?;
        reports.push(ReportStatusInfo {
            creation_time: ids::creation_time_secs(&id).unwrap_or_default(),
            id,
            status,
        });
    }
    Ok(ReportList {
        offset,
        limit,
        total,
        reports,
    })
}

/// Get the generation info of one report: creation time, current status,
/// and the verbatim original request.
#[instrument(skip(state))]
pub async fn handle_get_report_status(
    state: &ReportHandlerState,
    report_id: &str,
) -> Result<ReportGenerationInfo> {
    if !state.store.exists(report_id).await? {
        return Err(ReportError::ReportNotFound {
            report_id: report_id.to_string(),
        });
    }
    let status = state.store.status(report_id).await?;
    let request = state.store.read_request(report_id).await?;
    Ok(ReportGenerationInfo {
        creation_time: ids::creation_time_secs(report_id).unwrap_or_default(),
        status,
        request,
    })
}

/// Read a window of rows from a completed report.
///
/// Pagination bounds are checked before any storage access; a report that
/// is not COMPLETED is refused with its actual status named.
#[instrument(skip(state))]
pub async fn handle_get_report_rows(
    state: &ReportHandlerState,
    report_id: &str,
    offset: i64,
    limit: i64,
) -> Result<ReportContent> {
    validate_window(offset, limit, state.max_read_limit)?;

    if !state.store.exists(report_id).await? {
        return Err(ReportError::ReportNotFound {
            report_id: report_id.to_string(),
        });
    }
    let status = state.store.status(report_id).await?;
    if status != ReportStatus::Completed {
        return Err(ReportError::ReportNotReadable {
            report_id: report_id.to_string(),
            status: status.to_string(),
        });
    }

    let total = state.store.read_row_count(report_id).await?;
    let rows = state
        .store
        .read_rows(report_id, offset as u64, limit as usize)
        .await?;
    Ok(ReportContent {
        offset,
        limit,
        total,
        rows,
    })
}

fn validate_window(offset: i64, limit: i64, max_limit: i64) -> Result<()> {
    if offset < 0 {
        return Err(ReportError::InvalidPagination {
            message: "offset cannot be negative".to_string(),
        });
    }
    if limit <= 0 {
        return Err(ReportError::InvalidPagination {
            message: "limit must be a positive integer".to_string(),
        });
    }
    if limit > max_limit {
        return Err(ReportError::InvalidPagination {
            message: format!("limit cannot be larger than {max_limit}"),
        });
    }
    Ok(())
}
