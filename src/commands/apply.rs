//! `vmfleet apply` — build a batch from the current selection and drive it
//! through the executor's session protocol.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::cancel::CancelHandle;
use crate::application::services::executor::{self, BatchOutcome};
use crate::commands::ApplyArgs;
use crate::domain::batch::{Batch, Selection, SelectionItem};
use crate::domain::error::SelectionError;
use crate::domain::inventory::Inventory;
use crate::domain::operation::OperationKind;
use crate::domain::status::StatusBoard;
use crate::infra::{inventory, push, session::HttpSessionClient};
use crate::output::reporter::BatchReporter;
use crate::output::{json, table};

/// Run `vmfleet apply`.
///
/// # Errors
///
/// Returns an error when the selection fails validation (nothing is sent to
/// the executor in that case), when the session cannot be started or
/// finished, or when the batch aborts on a critical executor failure.
pub async fn run(args: &ApplyArgs, app: &AppContext) -> Result<()> {
    let result = execute(args, app).await;
    if app.is_json()
        && let Err(err) = &result
    {
        println!("{}", json::format_error(&format!("{err:#}"), "apply_failed")?);
    }
    result
}

async fn execute(args: &ApplyArgs, app: &AppContext) -> Result<()> {
    let inventory_path = args.inventory.as_ref().unwrap_or(&app.config.inventory);
    let inv = inventory::load(inventory_path)?;

    let items = selection_items(args, &inv)?;
    let confirmation = resolve_confirmation(args, app, &items)?;
    let selection = Selection {
        items,
        snapshot_name: args.snapshot_name.clone(),
        revert_name: args.revert_name.clone(),
        confirmation,
    };
    let batch = Batch::build(&selection)?;

    let base_url = args
        .executor_url
        .as_deref()
        .unwrap_or(&app.config.executor_url)
        .to_owned();
    let client = HttpSessionClient::new(&base_url)?;

    let board = Arc::new(StatusBoard::new());
    board.reset(&batch);

    // The push channel runs beside the orchestrator loop and only ever
    // writes to the status board.
    let push_task = tokio::spawn(push::run(
        reqwest::Client::new(),
        base_url.clone(),
        Arc::clone(&board),
    ));

    // Fresh token per batch; Ctrl-C requests cooperative cancellation,
    // honored between units.
    let cancel = CancelHandle::new();
    let ctrlc_task = {
        let cancel = cancel.clone();
        let output = app.output.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.request();
                output.warn("cancel requested - stopping after the current operation");
            }
        })
    };

    let reporter = BatchReporter::new(&app.output, &board);
    let outcome = executor::run_batch(&client, &reporter, &cancel, &batch).await;

    push_task.abort();
    ctrlc_task.abort();

    let outcome = outcome?;

    if app.is_json() {
        println!("{}", json::format_outcome(&outcome, &batch, &board)?);
        if outcome.is_error() {
            anyhow::bail!(outcome_message(&outcome).to_owned());
        }
        return Ok(());
    }

    table::render_status(&app.output, &batch, &board);
    table::render_counts(&app.output, &board);

    match &outcome {
        BatchOutcome::Completed { summary } => {
            if outcome.is_error() {
                anyhow::bail!(summary.message.clone());
            }
            app.output.success(&summary.message);
            Ok(())
        }
        BatchOutcome::Cancelled { summary } => {
            app.output.warn("operation run interrupted");
            if !summary.message.is_empty() {
                app.output.info(&summary.message);
            }
            Ok(())
        }
        BatchOutcome::Aborted { message } => anyhow::bail!(message.clone()),
    }
}

fn outcome_message(outcome: &BatchOutcome) -> &str {
    match outcome {
        BatchOutcome::Completed { summary } | BatchOutcome::Cancelled { summary } => {
            &summary.message
        }
        BatchOutcome::Aborted { message } => message,
    }
}

/// Resolve the raw selection: a plan file, or flag-based selection where
/// every chosen VM gets the same operation list.
fn selection_items(args: &ApplyArgs, inv: &Inventory) -> Result<Vec<SelectionItem>> {
    if let Some(plan_path) = &args.plan {
        let content = std::fs::read_to_string(plan_path)
            .with_context(|| format!("cannot read plan {}", plan_path.display()))?;
        let items: Vec<SelectionItem> = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse plan {}", plan_path.display()))?;
        for item in &items {
            if inv.find(&item.vm).is_none() {
                return Err(SelectionError::UnknownVm(item.vm.clone()).into());
            }
        }
        return Ok(items);
    }

    let vms: Vec<String> = if args.vms.is_empty() {
        inv.filtered(&args.groups)
            .into_iter()
            .map(|r| r.vm_name.clone())
            .collect()
    } else {
        for vm in &args.vms {
            if inv.find(vm).is_none() {
                return Err(SelectionError::UnknownVm(vm.clone()).into());
            }
        }
        args.vms.clone()
    };

    Ok(vms
        .into_iter()
        .map(|vm| SelectionItem {
            vm,
            ops: args.ops.clone(),
            snapshot_name: None,
            revert_name: None,
        })
        .collect())
}

/// The delete gate: an explicit `--confirm` token wins; otherwise prompt.
/// In non-interactive mode a missing token fails validation downstream.
fn resolve_confirmation(
    args: &ApplyArgs,
    app: &AppContext,
    items: &[SelectionItem],
) -> Result<Option<String>> {
    let wants_delete = items.iter().any(|i| i.ops.contains(&OperationKind::Delete));
    if !wants_delete {
        return Ok(None);
    }
    if args.confirm.is_some() {
        return Ok(args.confirm.clone());
    }
    app.prompt_token("Type 'delete' to confirm VM removal")
}
