//! `BatchReporter` — Presentation-layer implementation of `StatusSink`.
//!
//! Projects orchestrator progress onto the shared [`StatusBoard`] (the
//! authoritative per-unit map, also fed by the push channel) and mirrors it
//! to the terminal: a spinner while a unit is in flight on a TTY, plain
//! step lines otherwise.

use std::sync::Mutex;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::StatusSink;
use crate::domain::operation::OperationKind;
use crate::domain::status::{StatusBoard, UnitStatus};
use crate::output::{OutputContext, progress};

/// Terminal + status-board sink for one batch run.
pub struct BatchReporter<'a> {
    ctx: &'a OutputContext,
    board: &'a StatusBoard,
    spinner: Mutex<Option<ProgressBar>>,
}

impl<'a> BatchReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext, board: &'a StatusBoard) -> Self {
        Self {
            ctx,
            board,
            spinner: Mutex::new(None),
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
    }

    fn set_spinner(&self, pb: ProgressBar) {
        *self
            .spinner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(pb);
    }
}

impl StatusSink for BatchReporter<'_> {
    fn unit_status(&self, vm: &str, operation: OperationKind, status: UnitStatus) {
        self.board.apply(vm, operation, status);

        let label = format!("{operation} {vm}");
        match status {
            UnitStatus::Pending => {}
            UnitStatus::Active => {
                if self.ctx.show_progress() {
                    self.set_spinner(progress::spinner(&label));
                } else if !self.ctx.quiet {
                    println!("  {} {label}", "→".style(self.ctx.styles.active));
                }
            }
            UnitStatus::Success => {
                if let Some(pb) = self.take_spinner() {
                    progress::finish_ok(&pb, &label);
                } else {
                    self.ctx.success(&label);
                }
            }
            UnitStatus::Error => {
                if let Some(pb) = self.take_spinner() {
                    progress::finish_error(&pb, &label);
                } else {
                    self.ctx.error(&label);
                }
            }
        }
    }

    fn unit_message(&self, _vm: &str, _operation: OperationKind, message: &str) {
        self.ctx.warn(message);
    }

    fn controls_locked(&self, locked: bool) {
        if locked {
            self.ctx
                .info("Selection is locked while operations run. Ctrl-C cancels between operations.");
        } else if let Some(pb) = self.take_spinner() {
            // A fatal abort can leave the in-flight spinner behind.
            pb.finish_and_clear();
        }
    }
}
