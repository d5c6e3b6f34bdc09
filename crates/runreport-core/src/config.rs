// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::path::PathBuf;

/// Report engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for report artifacts
    pub data_dir: PathBuf,
    /// Base directory holding run-meta partitions, one subdirectory per
    /// namespace
    pub meta_dir: PathBuf,
    /// Upper bound for a single read window
    pub max_read_limit: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `RUNREPORT_DATA_DIR`: base directory for report artifacts
    /// - `RUNREPORT_META_DIR`: base directory of run-meta partitions
    ///
    /// Optional (with defaults):
    /// - `RUNREPORT_MAX_READ_LIMIT`: max rows/reports per read window
    ///   (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = std::env::var("RUNREPORT_DATA_DIR")
            .map_err(|_| ConfigError::Missing("RUNREPORT_DATA_DIR"))?
            .into();

        let meta_dir = std::env::var("RUNREPORT_META_DIR")
            .map_err(|_| ConfigError::Missing("RUNREPORT_META_DIR"))?
            .into();

        let max_read_limit: i64 = std::env::var("RUNREPORT_MAX_READ_LIMIT")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("RUNREPORT_MAX_READ_LIMIT", "must be a positive integer")
            })?;
        if max_read_limit <= 0 {
            return Err(ConfigError::Invalid(
                "RUNREPORT_MAX_READ_LIMIT",
                "must be a positive integer",
            ));
        }

        Ok(Self {
            data_dir,
            meta_dir,
            max_read_limit,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
