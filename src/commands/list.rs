//! `vmfleet list [--groups a,b]` — render the VM inventory.

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::ListArgs;
use crate::infra::inventory;

/// Run `vmfleet list`.
///
/// # Errors
///
/// Returns an error if the inventory cannot be loaded.
pub fn run(args: &ListArgs, app: &AppContext) -> Result<()> {
    let path = args.inventory.as_ref().unwrap_or(&app.config.inventory);
    let inv = inventory::load(path)?;
    let visible = inv.filtered(&args.groups);

    if app.is_json() {
        let rows: Vec<serde_json::Value> = visible
            .iter()
            .map(|r| serde_json::json!({"group": r.group, "vm": r.vm_name}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if visible.is_empty() {
        app.output.info("No VMs match the group filter.");
        return Ok(());
    }

    let mut current_group: Option<&str> = None;
    for record in visible {
        if current_group != Some(record.group.as_str()) {
            current_group = Some(record.group.as_str());
            println!();
            app.output.header(&record.group);
        }
        println!("    {}", record.vm_name);
    }
    println!();
    Ok(())
}
