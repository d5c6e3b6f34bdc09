// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Asynchronous report generation worker.
//!
//! Each accepted report is handed to exactly one spawned task, which is
//! the report's only writer for its entire lifetime: request persisted by
//! the submission path, then rows, then the row count, then the terminal
//! marker, in that order. There is no lock because there is nothing to
//! contend on — isolation across reports is the per-report directory.
//!
//! Input partitions are prefiltered twice before the compute engine sees
//! anything: by namespace directory when the request carries a namespace
//! filter, and by a coarse time bound on the partition file name. Both
//! prefilters may keep too much, never too little; the compute engine's
//! exact filtering is the correctness backstop.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use runreport_store::LocationRef;

use crate::request::ReportRequest;
use crate::store::ReportStore;

/// Suffix of run-meta partition files.
pub const META_FILE_SUFFIX: &str = ".jsonl";

/// External compute engine that scans the filtered input partitions and
/// materializes report rows.
///
/// The engine writes its row files (one JSON record per line, `.json`
/// suffix) into `output_dir` and returns the total row count. Filtering,
/// projection, and sorting per the request are entirely its concern.
#[async_trait]
pub trait ComputeEngine: Send + Sync {
    /// Generate report rows for the request from the given input partitions.
    async fn generate(
        &self,
        request: &ReportRequest,
        input_paths: Vec<String>,
        output_dir: LocationRef,
    ) -> Result<u64>;
}

/// Dispatch report generation off the calling thread.
///
/// The caller must have persisted the request marker already; this only
/// schedules the worker and returns immediately. Any failure inside the
/// worker ends in a failure marker carrying the cause. A secondary failure
/// while writing that marker is unrecoverable: it is logged loudly and the
/// report stays observably RUNNING.
pub fn spawn_report_generation(
    store: ReportStore,
    meta_base: LocationRef,
    engine: Arc<dyn ComputeEngine>,
    report_id: String,
    request: ReportRequest,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = generate_report(&store, &meta_base, engine.as_ref(), &report_id, &request).await
        {
            error!(%report_id, "report generation failed: {e:#}");
            if let Err(mark_err) = store.mark_failed(&report_id, &format!("{e:#}")).await {
                // No further marker to fall back to; the report will sit in
                // RUNNING until an operator looks at it.
                error!(
                    %report_id,
                    "failed to write failure marker, report is stuck RUNNING: {mark_err}"
                );
            }
        }
    })
}

async fn generate_report(
    store: &ReportStore,
    meta_base: &LocationRef,
    engine: &dyn ComputeEngine,
    report_id: &str,
    request: &ReportRequest,
) -> Result<()> {
    let input_paths = resolve_input_paths(meta_base, request).await?;
    debug!(
        report_id,
        partitions = input_paths.len(),
        "resolved input partitions"
    );

    let rows_dir = store.rows_dir(report_id);
    rows_dir.mkdirs().await?;
    let row_count = engine.generate(request, input_paths, rows_dir).await?;

    store.write_row_count(report_id, row_count).await?;
    store.mark_completed(report_id).await?;
    info!(report_id, rows = row_count, "report generation completed");
    Ok(())
}

/// Resolve the input partitions for a request.
///
/// Walks one directory per namespace under the meta base location. When
/// the request has a namespace filter it is applied to directory names
/// first, as a cheap prefilter over whole partitions. Partition files are
/// named by the earliest event time they contain, so a partition can be
/// excluded outright when even its earliest event is not before the
/// request's end bound.
pub(crate) async fn resolve_input_paths(
    meta_base: &LocationRef,
    request: &ReportRequest,
) -> Result<Vec<String>> {
    let namespace_filter = request.namespace_filter();
    let end = request.end.unwrap_or(i64::MAX);
    let mut paths = Vec::new();
    for ns_dir in meta_base.list().await? {
        if let Some(filter) = namespace_filter
            && !filter.apply(&ns_dir.name())
        {
            continue;
        }
        for partition in ns_dir.list().await? {
            let name = partition.name();
            let Some(prefix) = name.strip_suffix(META_FILE_SUFFIX) else {
                debug!(file = %name, "skipping non-partition file");
                continue;
            };
            match prefix.parse::<i64>() {
                Ok(earliest) if earliest < end => paths.push(partition.uri()),
                Ok(_) => {}
                Err(_) => {
                    debug!(file = %name, "skipping partition with unparsable time prefix");
                }
            }
        }
    }
    Ok(paths)
}
