//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, plus the machine-readable batch outcome.

use anyhow::{Context, Result};

use crate::application::services::executor::BatchOutcome;
use crate::domain::batch::Batch;
use crate::domain::status::{StatusBoard, UnitStatus};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen in
/// practice — `serde_json` only fails on non-finite floats and maps with
/// non-string keys, neither of which appear here).
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format a batch outcome with its per-unit statuses.
///
/// # Errors
///
/// Returns an error if JSON serialization fails (see [`format_error`]).
pub fn format_outcome(
    outcome: &BatchOutcome,
    batch: &Batch,
    board: &StatusBoard,
) -> Result<String> {
    let (result, message) = match outcome {
        BatchOutcome::Completed { summary } => ("completed", summary.message.clone()),
        BatchOutcome::Cancelled { summary } => ("cancelled", summary.message.clone()),
        BatchOutcome::Aborted { message } => ("aborted", message.clone()),
    };

    let units: Vec<serde_json::Value> = batch
        .units()
        .map(|(vm, op)| {
            serde_json::json!({
                "vm": vm,
                "operation": op,
                "status": board.get(vm, op).unwrap_or(UnitStatus::Pending),
            })
        })
        .collect();

    let obj = serde_json::json!({
        "result": result,
        "error": outcome.is_error(),
        "message": message,
        "counts": board.counts(),
        "units": units,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
