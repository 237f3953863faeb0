//! Inventory file reader.
//!
//! The inventory is a semicolon-delimited table with a header row; only the
//! `groupName` and `vmName` columns matter here (the executor consumes the
//! provisioning columns server-side). Rows without a VM name are skipped,
//! and a blank group maps to the ungrouped placeholder.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::inventory::{Inventory, UNGROUPED, VmRecord};

/// Load the inventory from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has no `vmName` column.
pub fn load(path: &Path) -> Result<Inventory> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read inventory {}", path.display()))?;
    parse(&content).with_context(|| format!("cannot parse inventory {}", path.display()))
}

/// Parse inventory file content.
///
/// # Errors
///
/// Returns an error when the header row is missing the `vmName` column.
pub fn parse(content: &str) -> Result<Inventory> {
    let content = content.trim_start_matches('\u{feff}');
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().context("inventory is empty")?;
    let columns: Vec<&str> = header.split(';').map(str::trim).collect();
    let vm_col = columns
        .iter()
        .position(|c| *c == "vmName")
        .context("inventory header has no vmName column")?;
    let group_col = columns.iter().position(|c| *c == "groupName");

    let mut records = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        let vm_name = fields.get(vm_col).copied().unwrap_or_default();
        if vm_name.is_empty() {
            continue;
        }
        let group = group_col
            .and_then(|i| fields.get(i))
            .copied()
            .filter(|g| !g.is_empty())
            .unwrap_or(UNGROUPED);
        records.push(VmRecord {
            group: group.to_owned(),
            vm_name: vm_name.to_owned(),
        });
    }

    Ok(Inventory { records })
}
