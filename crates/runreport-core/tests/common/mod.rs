// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for runreport-core integration tests.
//!
//! Provides a TestContext wrapping a fully wired [`ReportEngine`] over
//! scratch directories, a line-scanning [`ComputeEngine`] implementation
//! with the real aggregation and filtering semantics, and run-meta fixture
//! population.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use runreport_core::request::{Filter, Order, ReportRequest};
use runreport_core::runner::ComputeEngine;
use runreport_core::runtime::ReportEngine;
use runreport_core::store::ReportStatus;
use runreport_store::{FsLocation, LocationRef};

/// Test context that manages scratch directories and a wired engine.
pub struct TestContext {
    pub engine: ReportEngine,
    pub data_dir: tempfile::TempDir,
    pub meta_dir: tempfile::TempDir,
}

impl TestContext {
    /// Create a context with the line-scanning compute engine.
    pub fn new() -> Self {
        Self::with_compute_engine(Arc::new(LineScanEngine))
    }

    /// Create a context with a custom compute engine.
    pub fn with_compute_engine(compute: Arc<dyn ComputeEngine>) -> Self {
        init_tracing();
        let data_dir = tempfile::tempdir().expect("create data dir");
        let meta_dir = tempfile::tempdir().expect("create meta dir");
        let engine = ReportEngine::builder()
            .report_location(FsLocation::new(data_dir.path()))
            .meta_location(FsLocation::new(meta_dir.path()))
            .compute_engine(compute)
            .build()
            .expect("build engine");
        Self {
            engine,
            data_dir,
            meta_dir,
        }
    }

    /// Populate run-meta partitions with the standard fixture.
    ///
    /// Namespaces `default`, `ns1`, `ns2`, five partition files each at
    /// 1000-second intervals from `BASE_TIME`. Every file holds two runs:
    /// one that fails after 5 minutes and one that completes after 20.
    pub async fn populate_meta_files(&self) {
        let delay = 300; // 5 minutes in seconds
        for namespace in ["default", "ns1", "ns2"] {
            let ns_dir = self.meta_dir.path().join(namespace);
            tokio::fs::create_dir_all(&ns_dir).await.expect("mkdir ns");
            for i in 0..5i64 {
                let time = BASE_TIME + 1000 * i;
                let run1 = format!("run-{namespace}-{i}-1");
                let run2 = format!("run-{namespace}-{i}-2");
                let start_info = json!({
                    "user": "user",
                    "runtimeArgs": {"k1": "v1", "k2": "v2"}
                });
                let events = [
                    event(namespace, "SmartWorkflow", &run1, "STARTING", time, Some(&start_info)),
                    event(namespace, "SmartWorkflow", &run1, "FAILED", time + delay, None),
                    event(namespace, "SmartWorkflow_1", &run2, "STARTING", time + delay, None),
                    event(namespace, "SmartWorkflow_1", &run2, "RUNNING", time + 2 * delay, None),
                    event(namespace, "SmartWorkflow_1", &run2, "COMPLETED", time + 4 * delay, None),
                ];
                let content: String = events
                    .iter()
                    .map(|e| format!("{e}\n"))
                    .collect();
                tokio::fs::write(ns_dir.join(format!("{time}.jsonl")), content)
                    .await
                    .expect("write partition");
            }
        }
    }

    /// Poll a report until it reaches a terminal status, bounded.
    pub async fn wait_for_terminal(&self, report_id: &str) -> ReportStatus {
        for _ in 0..200 {
            let info = self
                .engine
                .report_status(report_id)
                .await
                .expect("report status");
            if info.status != ReportStatus::Running {
                return info.status;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("report {report_id} did not reach a terminal status in time");
    }
}

/// Base time of the standard fixture, epoch seconds.
pub const BASE_TIME: i64 = 1_520_808_000;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn event(
    namespace: &str,
    program: &str,
    run: &str,
    status: &str,
    time: i64,
    start_info: Option<&Value>,
) -> Value {
    json!({
        "namespace": namespace,
        "program": program,
        "run": run,
        "status": status,
        "time": time,
        "startInfo": start_info,
    })
}

// ============================================================================
// Line-scanning compute engine
// ============================================================================

/// One run status event from a meta partition file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunEvent {
    namespace: String,
    program: String,
    run: String,
    status: String,
    time: i64,
    #[serde(default)]
    start_info: Option<StartInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartInfo {
    user: Option<String>,
    runtime_args: Option<HashMap<String, String>>,
}

/// Aggregated view of one program run across its status events.
#[derive(Debug, Default, Serialize)]
struct RunSummary {
    namespace: String,
    program: String,
    run: String,
    status: String,
    start: Option<i64>,
    running: Option<i64>,
    end: Option<i64>,
    user: Option<String>,
    runtime_args: Option<String>,
}

impl RunSummary {
    fn duration(&self) -> Option<i64> {
        Some(self.end? - self.start?)
    }

    /// Catalog-field value of this run, `Null` when not known.
    fn field_value(&self, name: &str) -> Value {
        match name {
            "namespace" => json!(self.namespace),
            "program" => json!(self.program),
            "run" => json!(self.run),
            "status" => json!(self.status),
            "user" => json!(self.user),
            "startMethod" => Value::Null,
            "runtimeArgs" => json!(self.runtime_args),
            "start" => json!(self.start),
            "running" => json!(self.running),
            "end" => json!(self.end),
            "duration" => json!(self.duration()),
            // Log and record metrics are not present in run-meta events.
            "numLogWarnings" | "numLogErrors" | "numRecordsOut" => Value::Null,
            other => panic!("unknown field {other}"),
        }
    }
}

/// In-process compute engine that scans JSON-lines partitions.
///
/// Implements the full row semantics: per-run event aggregation, time-range
/// qualification, exact filter application (including re-checking what the
/// prefilters only approximated), projection, and single-key sort.
pub struct LineScanEngine;

#[async_trait]
impl ComputeEngine for LineScanEngine {
    async fn generate(
        &self,
        request: &ReportRequest,
        input_paths: Vec<String>,
        output_dir: LocationRef,
    ) -> Result<u64> {
        let mut runs: HashMap<String, RunSummary> = HashMap::new();
        for path in &input_paths {
            let path = path.strip_prefix("file://").unwrap_or(path);
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading partition {path}"))?;
            for line in content.lines().filter(|l| !l.trim().is_empty()) {
                let event: RunEvent =
                    serde_json::from_str(line).with_context(|| format!("parsing event: {line}"))?;
                apply_event(&mut runs, event);
            }
        }

        let start = request.start.context("request start missing")?;
        let end = request.end.context("request end missing")?;
        let mut qualifying: Vec<&RunSummary> = runs
            .values()
            .filter(|run| {
                // Started before the range ends, and not over before it begins.
                run.start.is_some_and(|s| s < end)
                    && run.end.is_none_or(|e| e >= start)
            })
            .filter(|run| {
                request
                    .filters
                    .iter()
                    .flatten()
                    .all(|filter| filter_passes(filter, run))
            })
            .collect();

        if let Some(sort) = request.sort.as_deref().and_then(|s| s.first()) {
            qualifying.sort_by_key(|run| sort_key(run, &sort.field_name));
            if sort.order == Order::Descending {
                qualifying.reverse();
            }
        }

        let fields = request.fields.clone().unwrap_or_default();
        let rows: Vec<String> = qualifying
            .iter()
            .map(|run| {
                let row: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.clone(), run.field_value(f)))
                    .collect();
                serde_json::to_string(&Value::Object(row))
            })
            .collect::<Result<_, _>>()?;

        output_dir
            .append("report.json")
            .write(rows.join("\n").as_bytes())
            .await?;
        Ok(rows.len() as u64)
    }
}

fn apply_event(runs: &mut HashMap<String, RunSummary>, event: RunEvent) {
    let summary = runs.entry(event.run.clone()).or_default();
    summary.namespace = event.namespace;
    summary.program = event.program;
    summary.run = event.run;
    summary.status = event.status.clone();
    match event.status.as_str() {
        "STARTING" => {
            summary.start = Some(event.time);
            if let Some(info) = event.start_info {
                summary.user = info.user;
                summary.runtime_args = info
                    .runtime_args
                    .as_ref()
                    .and_then(|args| serde_json::to_string(args).ok());
            }
        }
        "RUNNING" => summary.running = Some(event.time),
        "COMPLETED" | "FAILED" | "KILLED" => summary.end = Some(event.time),
        _ => {}
    }
}

fn filter_passes(filter: &Filter, run: &RunSummary) -> bool {
    match filter {
        Filter::StringValue(f) => match run.field_value(&f.field_name) {
            Value::String(s) => f.apply(&s),
            _ => false,
        },
        Filter::IntRange(f) => match run.field_value(&f.field_name).as_i64() {
            Some(v) => i32::try_from(v).is_ok_and(|v| f.apply(&v)),
            None => false,
        },
        Filter::LongRange(f) => match run.field_value(&f.field_name).as_i64() {
            Some(v) => f.apply(&v),
            None => false,
        },
    }
}

fn sort_key(run: &RunSummary, field_name: &str) -> i64 {
    // Sortable catalog fields are all numeric; absent values sort first.
    run.field_value(field_name).as_i64().unwrap_or(i64::MIN)
}
