//! The closed set of VM lifecycle operations and their execution order.
//!
//! This module is intentionally free of I/O, async, and external layer
//! imports. All functions take data in and return data out.

use serde::{Deserialize, Serialize};

/// A single lifecycle operation that can be applied to a VM.
///
/// Declaration order is the global execution priority: within one batch a
/// VM's selected operations always run in this order, regardless of the
/// order they were selected in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Destroy the VM (requires typed confirmation).
    Delete,
    /// Clone the VM from its configured source template.
    Clone,
    /// Apply guest OS customization (hostname, network, users).
    Customize,
    /// Reconfigure virtual hardware (CPU count, memory).
    Hardware,
    /// Create a snapshot.
    Snapshot,
    /// Revert to a named snapshot.
    Revert,
    /// Power the VM off.
    Poweroff,
    /// Power the VM on.
    Poweron,
}

impl OperationKind {
    /// All operations in global priority order.
    pub const ALL: [OperationKind; 8] = [
        OperationKind::Delete,
        OperationKind::Clone,
        OperationKind::Customize,
        OperationKind::Hardware,
        OperationKind::Snapshot,
        OperationKind::Revert,
        OperationKind::Poweroff,
        OperationKind::Poweron,
    ];

    /// Lowercase wire name used by the executor protocol and push events.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            OperationKind::Delete => "delete",
            OperationKind::Clone => "clone",
            OperationKind::Customize => "customize",
            OperationKind::Hardware => "hardware",
            OperationKind::Snapshot => "snapshot",
            OperationKind::Revert => "revert",
            OperationKind::Poweroff => "poweroff",
            OperationKind::Poweron => "poweron",
        }
    }

    /// Parse a wire name back into an operation kind.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.wire_name() == name)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}
