// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for runreport-core.
//!
//! Provides a unified error type that maps to stable error codes and
//! HTTP-equivalent status classes for the outer transport layer.

use std::fmt;

use runreport_store::StoreError;

/// Result type using ReportError
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while processing report operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum ReportError {
    /// The submitted request failed validation or decoding (client fault).
    InvalidRequest {
        /// Every violation found, in discovery order.
        errors: Vec<String>,
    },

    /// A pagination parameter is out of bounds (client fault).
    InvalidPagination {
        /// Description of the violated bound.
        message: String,
    },

    /// No report exists with the given identifier.
    ReportNotFound {
        /// The report ID that was not found.
        report_id: String,
    },

    /// Report rows were requested before the report reached COMPLETED.
    ReportNotReadable {
        /// The report ID.
        report_id: String,
        /// The report's actual status.
        status: String,
    },

    /// A report that claims to be COMPLETED is missing durable artifacts
    /// (internal consistency fault).
    CorruptReport {
        /// The report ID.
        report_id: String,
        /// What was expected and missing.
        details: String,
    },

    /// A storage operation failed.
    StorageError {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },
}

impl ReportError {
    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::InvalidPagination { .. } => "INVALID_PAGINATION",
            Self::ReportNotFound { .. } => "REPORT_NOT_FOUND",
            Self::ReportNotReadable { .. } => "REPORT_NOT_READABLE",
            Self::CorruptReport { .. } => "CORRUPT_REPORT",
            Self::StorageError { .. } => "STORAGE_ERROR",
        }
    }

    /// HTTP-equivalent status class for transports that surface this error.
    ///
    /// Client faults are 400, unknown reports 404, internal faults 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. }
            | Self::InvalidPagination { .. }
            | Self::ReportNotReadable { .. } => 400,
            Self::ReportNotFound { .. } => 404,
            Self::CorruptReport { .. } | Self::StorageError { .. } => 500,
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest { errors } => {
                write!(
                    f,
                    "Invalid report generation request: {}",
                    errors.join(",")
                )
            }
            Self::InvalidPagination { message } => write!(f, "{}", message),
            Self::ReportNotFound { report_id } => {
                write!(f, "Report with id {} does not exist.", report_id)
            }
            Self::ReportNotReadable { report_id, status } => {
                write!(
                    f,
                    "Report with id {} with status {} cannot be read.",
                    report_id, status
                )
            }
            Self::CorruptReport { report_id, details } => {
                write!(f, "Report {} is corrupt: {}", report_id, details)
            }
            Self::StorageError { operation, details } => {
                write!(f, "Storage error during '{}': {}", operation, details)
            }
        }
    }
}

impl std::error::Error for ReportError {}

impl From<StoreError> for ReportError {
    fn from(err: StoreError) -> Self {
        ReportError::StorageError {
            operation: "location".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::InvalidRequest {
            errors: vec![format!("Request body is invalid json: {}", err)],
        }
    }
}
