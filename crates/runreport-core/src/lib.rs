// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runreport Core - Durable Report Generation Engine
//!
//! This crate validates report generation requests, dispatches them to an
//! asynchronous compute engine, and tracks each report's lifecycle through
//! durable filesystem markers so that status survives process crashes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Outer Transport                          │
//! │              (HTTP surface, CLI, embedding app)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     runreport-core                           │
//! │   (This Crate: validation, dispatch, status projection)      │
//! └─────────────────────────────────────────────────────────────┘
//!        │                    │                     │
//!        │ reads              │ spawns              │ writes
//!        ▼                    ▼                     ▼
//! ┌──────────────┐   ┌─────────────────┐   ┌──────────────────┐
//! │ Run-Meta     │   │ ComputeEngine   │   │ Report Artifacts │
//! │ Partitions   │   │ (rows per       │   │ (_START, COUNT,  │
//! │ (per ns)     │   │  request)       │   │  _SUCCESS, ...)  │
//! └──────────────┘   └─────────────────┘   └──────────────────┘
//! ```
//!
//! # Operations
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `submit_report` | Validate a request, persist it, dispatch generation, return the ID |
//! | `list_reports` | Paginated status listing, ascending by creation time |
//! | `report_status` | Creation time, current status, and verbatim request of one report |
//! | `report_rows` | Paginated row window of a COMPLETED report |
//!
//! # Report Status State Machine
//!
//! ```text
//!           ┌─────────┐
//!           │ RUNNING │
//!           └────┬────┘
//!                │
//!       ┌────────┴────────┐
//!  _SUCCESS            _FAILURE
//!       │                 │
//!       ▼                 ▼
//! ┌───────────┐      ┌────────┐
//! │ COMPLETED │      │ FAILED │
//! └───────────┘      └────────┘
//! ```
//!
//! Status is never stored as a value: it is a pure projection of which
//! terminal marker files exist in the report's directory. Terminal states
//! are absorbing; the store refuses to write a second terminal marker.
//!
//! | Status | Description |
//! |--------|-------------|
//! | `RUNNING` | Report accepted, no terminal marker yet |
//! | `COMPLETED` | `_SUCCESS` marker exists; rows are readable |
//! | `FAILED` | `_FAILURE` marker exists; cause is stored inside it |
//!
//! # Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `RUNREPORT_DATA_DIR` | Yes | - | Base directory for report artifacts |
//! | `RUNREPORT_META_DIR` | Yes | - | Base directory of run-meta partitions |
//! | `RUNREPORT_MAX_READ_LIMIT` | No | `10000` | Max rows/reports per read window |
//!
//! # Modules
//!
//! - [`config`]: Engine configuration from environment variables
//! - [`error`]: Error types with error code and HTTP status class mapping
//! - [`fields`]: The catalog of reportable fields and their filter rules
//! - [`handlers`]: Transport-agnostic report operation handlers
//! - [`ids`]: Time-ordered report identifiers
//! - [`request`]: Request model, filter dispatch, and validation
//! - [`runner`]: Asynchronous generation worker and the [`ComputeEngine`] seam
//! - [`runtime`]: Embeddable [`ReportEngine`] facade
//! - [`store`]: Durable marker-based report state tracking
//!
//! [`ComputeEngine`]: runner::ComputeEngine
//! [`ReportEngine`]: runtime::ReportEngine

#![deny(missing_docs)]

/// Engine configuration loaded from environment variables.
pub mod config;

/// Error types with error code and HTTP status class mapping.
pub mod error;

/// The catalog of reportable fields and their filter rules.
pub mod fields;

/// Transport-agnostic report operation handlers.
pub mod handlers;

/// Time-ordered report identifiers.
pub mod ids;

/// Request model, filter dispatch, and validation.
pub mod request;

/// Asynchronous generation worker and the compute engine seam.
pub mod runner;

/// Embeddable report engine facade.
pub mod runtime;

/// Durable marker-based report state tracking.
pub mod store;
