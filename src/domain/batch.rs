//! Work model — the (VM × operation) selection and its validated batch.
//!
//! A [`Batch`] is built once per execution run from the current selection,
//! is immutable afterwards, and is owned by the orchestrator for the
//! duration of that run. Every validation failure here happens before any
//! network call: a selection that does not validate never starts a session.

use serde::Deserialize;

use crate::domain::error::SelectionError;
use crate::domain::operation::OperationKind;

/// One row of the raw user selection: a VM and the operations ticked for it.
///
/// This is also the plan-file entry shape (`apply --plan`), where an item
/// may override the selection-wide snapshot/revert names.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionItem {
    /// Target VM name.
    pub vm: String,
    /// Selected operations, in any order, duplicates tolerated.
    pub ops: Vec<OperationKind>,
    /// Per-item snapshot name override.
    #[serde(default)]
    pub snapshot_name: Option<String>,
    /// Per-item revert name override.
    #[serde(default)]
    pub revert_name: Option<String>,
}

/// The raw selection a batch is built from.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Per-VM operation picks, in selection order.
    pub items: Vec<SelectionItem>,
    /// Snapshot name applied to every item that selected `snapshot`.
    /// Empty or absent means "let the executor pick a default name".
    pub snapshot_name: Option<String>,
    /// Snapshot name applied to every item that selected `revert`.
    pub revert_name: Option<String>,
    /// Typed confirmation token, required when `delete` is selected.
    pub confirmation: Option<String>,
}

/// A single VM and its validated, priority-ordered operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Target VM name.
    pub vm_name: String,
    /// Non-empty, deduplicated, sorted by the global priority order.
    pub operations: Vec<OperationKind>,
    /// Present iff `operations` contains `snapshot`. An empty string means
    /// the executor chooses a default name.
    pub snapshot_name: Option<String>,
    /// Present iff `operations` contains `revert`; always non-empty.
    pub revert_name: Option<String>,
}

/// The full, validated set of work for one execution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    items: Vec<WorkItem>,
}

impl Batch {
    /// Build and validate a batch from the raw selection.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] when the selection is empty, selects no
    /// operations, carries an invalid or missing snapshot/revert name, or
    /// selects `delete` without the typed confirmation.
    pub fn build(selection: &Selection) -> Result<Self, SelectionError> {
        if selection.items.is_empty() {
            return Err(SelectionError::EmptySelection);
        }
        if selection.items.iter().all(|item| item.ops.is_empty()) {
            return Err(SelectionError::NoOperationSelected);
        }

        // Merge rows first: the same VM listed twice unions its operations,
        // and the first explicit name override wins. Names are stamped only
        // after merging so they always match the final operation set.
        let mut merged: Vec<SelectionItem> = Vec::new();
        for picked in &selection.items {
            if picked.ops.is_empty() {
                continue;
            }
            match merged.iter_mut().find(|m| m.vm == picked.vm) {
                Some(row) => {
                    row.ops.extend_from_slice(&picked.ops);
                    if row.snapshot_name.is_none() {
                        row.snapshot_name = picked.snapshot_name.clone();
                    }
                    if row.revert_name.is_none() {
                        row.revert_name = picked.revert_name.clone();
                    }
                }
                None => merged.push(picked.clone()),
            }
        }

        let mut items: Vec<WorkItem> = Vec::new();
        for row in merged {
            let mut operations = row.ops;
            operations.sort_unstable();
            operations.dedup();

            let snapshot_name = if operations.contains(&OperationKind::Snapshot) {
                let name = row
                    .snapshot_name
                    .as_deref()
                    .or(selection.snapshot_name.as_deref())
                    .unwrap_or("")
                    .trim()
                    .to_owned();
                if !name.is_empty() && !is_valid_name(&name) {
                    return Err(SelectionError::InvalidName(name));
                }
                Some(name)
            } else {
                None
            };

            let revert_name = if operations.contains(&OperationKind::Revert) {
                let name = row
                    .revert_name
                    .as_deref()
                    .or(selection.revert_name.as_deref())
                    .unwrap_or("")
                    .trim()
                    .to_owned();
                if name.is_empty() {
                    return Err(SelectionError::MissingRevertName);
                }
                if !is_valid_name(&name) {
                    return Err(SelectionError::InvalidName(name));
                }
                Some(name)
            } else {
                None
            };

            items.push(WorkItem {
                vm_name: row.vm,
                operations,
                snapshot_name,
                revert_name,
            });
        }

        let wants_delete = items
            .iter()
            .any(|i| i.operations.contains(&OperationKind::Delete));
        if wants_delete && !is_confirmed(selection.confirmation.as_deref()) {
            return Err(SelectionError::NotConfirmed);
        }

        Ok(Self { items })
    }

    /// Work items in selection order.
    #[must_use]
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Flat (VM, operation) units in execution order.
    pub fn units(&self) -> impl Iterator<Item = (&str, OperationKind)> {
        self.items
            .iter()
            .flat_map(|item| item.operations.iter().map(|op| (item.vm_name.as_str(), *op)))
    }

    /// Total number of units in the batch.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.items.iter().map(|i| i.operations.len()).sum()
    }
}

/// Check a snapshot/revert name against the allowed character set
/// (latin letters, digits, hyphen, underscore).
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// The delete gate: the typed token must be the literal word `delete`,
/// case-insensitively.
#[must_use]
pub fn is_confirmed(token: Option<&str>) -> bool {
    token.is_some_and(|t| t.trim().eq_ignore_ascii_case("delete"))
}
