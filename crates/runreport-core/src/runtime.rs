// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Embeddable report engine.
//!
//! This module provides [`ReportEngine`] which allows embedding the report
//! engine into an existing tokio application. The engine owns the shared
//! handler state; an outer transport calls its methods and maps errors to
//! its own wire format.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use runreport_core::runtime::ReportEngine;
//! use runreport_store::FsLocation;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = ReportEngine::builder()
//!         .report_location(FsLocation::new("/var/lib/runreport/data"))
//!         .meta_location(FsLocation::new("/var/lib/runreport/meta"))
//!         .compute_engine(Arc::new(MyComputeEngine))
//!         .build()?;
//!
//!     let accepted = engine.submit_report(request_body).await?;
//!     println!("report {}", accepted.id);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use anyhow::Result;

use runreport_store::LocationRef;

use crate::handlers::{
    self, DEFAULT_MAX_READ_LIMIT, ReportContent, ReportGenerationInfo, ReportHandlerState,
    ReportList, SubmitReportResponse,
};
use crate::runner::ComputeEngine;
use crate::store::ReportStore;

/// Builder for creating a [`ReportEngine`].
pub struct ReportEngineBuilder {
    report_location: Option<LocationRef>,
    meta_location: Option<LocationRef>,
    compute_engine: Option<Arc<dyn ComputeEngine>>,
    max_read_limit: i64,
}

impl std::fmt::Debug for ReportEngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEngineBuilder")
            .field(
                "report_location",
                &self.report_location.as_ref().map(|l| l.uri()),
            )
            .field("meta_location", &self.meta_location.as_ref().map(|l| l.uri()))
            .field("compute_engine", &self.compute_engine.as_ref().map(|_| "..."))
            .field("max_read_limit", &self.max_read_limit)
            .finish()
    }
}

impl Default for ReportEngineBuilder {
    fn default() -> Self {
        Self {
            report_location: None,
            meta_location: None,
            compute_engine: None,
            max_read_limit: DEFAULT_MAX_READ_LIMIT,
        }
    }
}

impl ReportEngineBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base location for report artifacts (required).
    pub fn report_location(mut self, location: LocationRef) -> Self {
        self.report_location = Some(location);
        self
    }

    /// Set the base location of run-meta partitions (required).
    pub fn meta_location(mut self, location: LocationRef) -> Self {
        self.meta_location = Some(location);
        self
    }

    /// Set the compute engine that materializes report rows (required).
    pub fn compute_engine(mut self, engine: Arc<dyn ComputeEngine>) -> Self {
        self.compute_engine = Some(engine);
        self
    }

    /// Set the upper bound for a single read window.
    ///
    /// Default: `10000`
    pub fn max_read_limit(mut self, limit: i64) -> Self {
        self.max_read_limit = limit;
        self
    }

    /// Build the engine.
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<ReportEngine> {
        let report_location = self
            .report_location
            .ok_or_else(|| anyhow::anyhow!("report_location is required"))?;
        let meta_location = self
            .meta_location
            .ok_or_else(|| anyhow::anyhow!("meta_location is required"))?;
        let compute_engine = self
            .compute_engine
            .ok_or_else(|| anyhow::anyhow!("compute_engine is required"))?;
        if self.max_read_limit <= 0 {
            anyhow::bail!("max_read_limit must be positive");
        }

        Ok(ReportEngine {
            state: Arc::new(ReportHandlerState {
                store: ReportStore::new(report_location),
                meta_base: meta_location,
                engine: compute_engine,
                max_read_limit: self.max_read_limit,
            }),
        })
    }
}

/// An embeddable report engine.
///
/// The engine is cheap to clone through its inner `Arc` state; report
/// generation itself runs on spawned tokio tasks, so no background service
/// needs starting or stopping.
pub struct ReportEngine {
    state: Arc<ReportHandlerState>,
}

impl std::fmt::Debug for ReportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEngine")
            .field("state", &self.state)
            .finish()
    }
}

impl ReportEngine {
    /// Create a new builder for configuring the engine.
    pub fn builder() -> ReportEngineBuilder {
        ReportEngineBuilder::new()
    }

    /// Get a reference to the shared handler state.
    pub fn state(&self) -> &Arc<ReportHandlerState> {
        &self.state
    }

    /// Submit a report generation request; returns the accepted ID.
    pub async fn submit_report(&self, body: &str) -> crate::error::Result<SubmitReportResponse> {
        handlers::handle_submit_report(&self.state, body).await
    }

    /// List report statuses, paginated.
    pub async fn list_reports(&self, offset: i64, limit: i64) -> crate::error::Result<ReportList> {
        handlers::handle_list_reports(&self.state, offset, limit).await
    }

    /// Get the generation info of one report.
    pub async fn report_status(&self, report_id: &str) -> crate::error::Result<ReportGenerationInfo> {
        handlers::handle_get_report_status(&self.state, report_id).await
    }

    /// Read a window of rows from a completed report.
    pub async fn report_rows(
        &self,
        report_id: &str,
        offset: i64,
        limit: i64,
    ) -> crate::error::Result<ReportContent> {
        handlers::handle_get_report_rows(&self.state, report_id, offset, limit).await
    }
}
