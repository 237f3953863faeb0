//! Application service — batch execution use-case.
//!
//! The orchestrator drives one validated [`Batch`] through the executor's
//! session protocol: one sequential, non-parallel stream of unit calls with
//! explicit suspension at each network round trip. Imports only from
//! `crate::domain` and `crate::application`; all I/O is routed through the
//! injected port traits.

use anyhow::{Context, Result};

use crate::application::cancel::CancelHandle;
use crate::application::ports::{FinishReport, RemoteStatus, SessionClient, StatusSink};
use crate::domain::batch::Batch;
use crate::domain::status::UnitStatus;

/// Outcome of the `run_batch` use-case.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Every unit was attempted and the session closed normally. The
    /// summary status is `error` when some units failed.
    Completed { summary: FinishReport },
    /// The user cancelled between units; attempted units keep their
    /// terminal status, the rest stayed pending, and the session still
    /// closed through `finish` for a consistent partial summary.
    Cancelled { summary: FinishReport },
    /// A critical error or connectivity loss aborted the batch partway
    /// through; remaining units were skipped and the session was released
    /// through `cancel`.
    Aborted { message: String },
}

impl BatchOutcome {
    /// `true` when the outcome should be rendered as an error-level message.
    #[must_use]
    pub fn is_error(&self) -> bool {
        match self {
            BatchOutcome::Completed { summary } | BatchOutcome::Cancelled { summary } => {
                summary.status == RemoteStatus::Error
            }
            BatchOutcome::Aborted { .. } => true,
        }
    }
}

/// Execute a batch against the remote executor.
///
/// Selection-affecting controls are locked for the whole run and unlocked
/// on every exit path, including start failures and fatal aborts.
///
/// # Errors
///
/// Returns an error when the session cannot be started (no unit is
/// attempted) or when the closing `finish` call itself fails (the session
/// is released through `cancel` first).
pub async fn run_batch(
    client: &impl SessionClient,
    sink: &impl StatusSink,
    cancel: &CancelHandle,
    batch: &Batch,
) -> Result<BatchOutcome> {
    sink.controls_locked(true);
    let result = drive(client, sink, cancel, batch).await;
    sink.controls_locked(false);
    result
}

async fn drive(
    client: &impl SessionClient,
    sink: &impl StatusSink,
    cancel: &CancelHandle,
    batch: &Batch,
) -> Result<BatchOutcome> {
    for (vm, op) in batch.units() {
        sink.unit_status(vm, op, UnitStatus::Pending);
    }

    let session = client
        .start(batch)
        .await
        .context("starting operation session")?;

    // None = the loop ended normally or via cancellation; Some = fatal.
    let mut fatal: Option<String> = None;

    'items: for item in batch.items() {
        for &op in &item.operations {
            if cancel.is_requested() {
                break 'items;
            }

            sink.unit_status(&item.vm_name, op, UnitStatus::Active);

            match client.execute_one(&session, item, op).await {
                Ok(outcome) => match outcome.status {
                    RemoteStatus::Success => {
                        sink.unit_status(&item.vm_name, op, UnitStatus::Success);
                    }
                    RemoteStatus::Error => {
                        // One VM's failure never stops the batch.
                        sink.unit_status(&item.vm_name, op, UnitStatus::Error);
                        if let Some(message) = outcome.message.as_deref() {
                            sink.unit_message(&item.vm_name, op, message);
                        }
                    }
                    RemoteStatus::CriticalError => {
                        sink.unit_status(&item.vm_name, op, UnitStatus::Error);
                        fatal = Some(
                            outcome
                                .message
                                .unwrap_or_else(|| "executor reported a critical error".into()),
                        );
                        break 'items;
                    }
                },
                Err(err) if err.is_fatal() => {
                    sink.unit_status(&item.vm_name, op, UnitStatus::Error);
                    fatal = Some(err.to_string());
                    break 'items;
                }
                Err(err) => {
                    sink.unit_status(&item.vm_name, op, UnitStatus::Error);
                    sink.unit_message(&item.vm_name, op, &err.to_string());
                }
            }
        }
    }

    if let Some(message) = fatal {
        // Best effort: the session is already lost if this fails too.
        let _ = client.cancel(&session).await;
        return Ok(BatchOutcome::Aborted { message });
    }

    match client.finish(&session).await {
        Ok(summary) => {
            if cancel.is_requested() {
                Ok(BatchOutcome::Cancelled { summary })
            } else {
                Ok(BatchOutcome::Completed { summary })
            }
        }
        Err(err) => {
            let _ = client.cancel(&session).await;
            Err(err).context("finishing operation session")
        }
    }
}
