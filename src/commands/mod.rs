//! Command implementations

pub mod apply;
pub mod config;
pub mod list;
pub mod version;

use std::path::PathBuf;

use clap::Args;

use crate::domain::operation::OperationKind;

/// Arguments for the list command.
#[derive(Args, Default)]
pub struct ListArgs {
    /// Only show VMs from these groups (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Inventory file (overrides the configured path)
    #[arg(long)]
    pub inventory: Option<PathBuf>,
}

/// Arguments for the apply command.
#[derive(Args, Default)]
pub struct ApplyArgs {
    /// Apply to every VM in these groups (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "plan")]
    pub groups: Vec<String>,

    /// Apply to these VMs (comma-separated; default: all VMs in the group filter)
    #[arg(long, value_delimiter = ',', conflicts_with = "plan")]
    pub vms: Vec<String>,

    /// Operations to apply to every selected VM (comma-separated)
    #[arg(long, value_delimiter = ',', value_enum, conflicts_with = "plan")]
    pub ops: Vec<OperationKind>,

    /// YAML plan file with per-VM operation selections
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Snapshot name for `snapshot` operations (empty: executor default)
    #[arg(long)]
    pub snapshot_name: Option<String>,

    /// Snapshot name for `revert` operations (required with `revert`)
    #[arg(long)]
    pub revert_name: Option<String>,

    /// Confirmation token for `delete` (the literal word "delete")
    #[arg(long)]
    pub confirm: Option<String>,

    /// Executor base URL (overrides the configured one)
    #[arg(long, env = "VMFLEET_EXECUTOR_URL")]
    pub executor_url: Option<String>,

    /// Inventory file (overrides the configured path)
    #[arg(long)]
    pub inventory: Option<PathBuf>,
}
