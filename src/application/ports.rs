//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use serde::Deserialize;

use crate::domain::batch::{Batch, WorkItem};
use crate::domain::error::SessionError;
use crate::domain::operation::OperationKind;
use crate::domain::status::UnitStatus;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Server-assigned identifier correlating one batch's execute/finish/cancel
/// calls. Created by the executor's start call; dies with the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result status reported by the executor for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    Success,
    Error,
    /// Systemic failure (the executor's control plane is down); aborts the
    /// remaining batch rather than just the current unit.
    CriticalError,
}

/// Outcome of one `execute-operation` call.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteOutcome {
    pub status: RemoteStatus,
    #[serde(default)]
    pub message: Option<String>,
}

/// The batch's final summary, produced by `finish-operations`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinishReport {
    pub status: RemoteStatus,
    #[serde(default)]
    pub message: String,
}

// ── Session Protocol Port ─────────────────────────────────────────────────────

/// The four remote calls of the executor's session protocol.
///
/// One batch maps onto exactly one session: `start` once, `execute_one` per
/// unit, then either `finish` (normal completion or user cancellation) or
/// `cancel` (fatal abort partway through).
#[allow(async_fn_in_trait)]
pub trait SessionClient {
    /// Open a session for the batch. Nothing executes unless this succeeds.
    async fn start(&self, batch: &Batch) -> Result<SessionId, SessionError>;

    /// Execute one (VM, operation) unit within the session.
    async fn execute_one(
        &self,
        session: &SessionId,
        item: &WorkItem,
        operation: OperationKind,
    ) -> Result<ExecuteOutcome, SessionError>;

    /// Close the session and collect the final summary.
    async fn finish(&self, session: &SessionId) -> Result<FinishReport, SessionError>;

    /// Tell the executor to release the session after a fatal abort.
    async fn cancel(&self, session: &SessionId) -> Result<(), SessionError>;
}

// ── Status Projection Port ────────────────────────────────────────────────────

/// Presentation callback for batch progress. Sync trait — no async needed.
///
/// The orchestrator drives per-unit status transitions and the lock state of
/// selection-affecting controls through this port instead of mutating any
/// presentation state directly.
pub trait StatusSink {
    /// A unit moved to a new status.
    fn unit_status(&self, vm: &str, operation: OperationKind, status: UnitStatus);

    /// A unit produced a non-fatal error message worth showing.
    fn unit_message(&self, vm: &str, operation: OperationKind, message: &str);

    /// Selection-affecting controls must be disabled (`true`) for the
    /// duration of a run and re-enabled (`false`) on every exit path.
    fn controls_locked(&self, locked: bool);
}
