//! Per-unit status projection.
//!
//! The [`StatusBoard`] is written by two independent sources: the
//! orchestrator (synchronously, for units it just executed) and the
//! out-of-band push channel from the executor. Last writer wins; no
//! ordering is guaranteed between the two sources beyond "most recent
//! applied status is shown". That relaxed consistency is intentional.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::domain::batch::Batch;
use crate::domain::operation::OperationKind;

/// Lifecycle of a single (VM, operation) unit. Transitions only move
/// forward within one batch; building a new batch resets everything to
/// `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Pending,
    Active,
    Success,
    Error,
}

impl UnitStatus {
    /// `true` once the unit can no longer change within this batch run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, UnitStatus::Success | UnitStatus::Error)
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnitStatus::Pending => "pending",
            UnitStatus::Active => "active",
            UnitStatus::Success => "success",
            UnitStatus::Error => "error",
        })
    }
}

/// Shared per-unit status map for the currently rendered batch.
///
/// Membership is defined by [`StatusBoard::reset`]: only units of the
/// current batch are tracked, and stale push events for anything else are
/// dropped.
#[derive(Debug, Default)]
pub struct StatusBoard {
    units: Mutex<HashMap<(String, OperationKind), UnitStatus>>,
}

impl StatusBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked set with the batch's units, all `Pending`.
    pub fn reset(&self, batch: &Batch) {
        let mut units = self.units.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        units.clear();
        for (vm, op) in batch.units() {
            units.insert((vm.to_owned(), op), UnitStatus::Pending);
        }
    }

    /// Apply a status update. Returns `false` when the unit is not part of
    /// the tracked batch (the update is dropped).
    pub fn apply(&self, vm: &str, op: OperationKind, status: UnitStatus) -> bool {
        let mut units = self.units.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match units.get_mut(&(vm.to_owned(), op)) {
            Some(slot) => {
                *slot = status;
                true
            }
            None => false,
        }
    }

    /// Current status of one unit.
    #[must_use]
    pub fn get(&self, vm: &str, op: OperationKind) -> Option<UnitStatus> {
        self.units
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&(vm.to_owned(), op))
            .copied()
    }

    /// Tally of units per status, for the run summary.
    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        let units = self.units.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut counts = StatusCounts::default();
        for status in units.values() {
            match status {
                UnitStatus::Pending => counts.pending += 1,
                UnitStatus::Active => counts.active += 1,
                UnitStatus::Success => counts.success += 1,
                UnitStatus::Error => counts.error += 1,
            }
        }
        counts
    }
}

/// Per-status unit tallies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub active: usize,
    pub success: usize,
    pub error: usize,
}
