//! Human-readable rendering of the per-unit status table and run summary.

use owo_colors::OwoColorize as _;

use crate::domain::batch::Batch;
use crate::domain::status::{StatusBoard, UnitStatus};
use crate::output::OutputContext;

/// Render the final per-unit status table for a batch.
///
/// One line per VM, one glyph per operation:
///
/// ```text
///   web-01   ✓ poweroff   ✓ snapshot
///   web-02   ✗ poweroff
/// ```
pub fn render_status(ctx: &OutputContext, batch: &Batch, board: &StatusBoard) {
    if ctx.quiet {
        return;
    }

    let width = batch
        .items()
        .iter()
        .map(|i| i.vm_name.len())
        .max()
        .unwrap_or(0);

    println!();
    for item in batch.items() {
        let mut line = format!("  {:width$}", item.vm_name);
        for &op in &item.operations {
            let status = board.get(&item.vm_name, op).unwrap_or(UnitStatus::Pending);
            let cell = match status {
                UnitStatus::Pending => format!("· {op}").style(ctx.styles.dim).to_string(),
                UnitStatus::Active => format!("→ {op}").style(ctx.styles.active).to_string(),
                UnitStatus::Success => format!("✓ {op}").style(ctx.styles.success).to_string(),
                UnitStatus::Error => format!("✗ {op}").style(ctx.styles.error).to_string(),
            };
            line.push_str("   ");
            line.push_str(&cell);
        }
        println!("{line}");
    }
    println!();
}

/// Render the unit tallies under the table.
pub fn render_counts(ctx: &OutputContext, board: &StatusBoard) {
    let counts = board.counts();
    let mut parts = vec![format!("{} succeeded", counts.success)];
    if counts.error > 0 {
        parts.push(format!("{} failed", counts.error));
    }
    if counts.pending > 0 {
        parts.push(format!("{} not attempted", counts.pending));
    }
    ctx.kv("Units", &parts.join(", "));
}
