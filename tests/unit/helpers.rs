//! Shared stubs for the unit tests: a scriptable session client and a
//! recording status sink.

#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::Mutex;

use vmfleet::application::cancel::CancelHandle;
use vmfleet::application::ports::{
    ExecuteOutcome, FinishReport, RemoteStatus, SessionClient, SessionId, StatusSink,
};
use vmfleet::domain::batch::{Batch, Selection, SelectionItem, WorkItem};
use vmfleet::domain::error::SessionError;
use vmfleet::domain::operation::OperationKind;
use vmfleet::domain::status::UnitStatus;

// ── Batch builders ────────────────────────────────────────────────────────────

/// Build a batch where each `(vm, ops)` pair becomes one work item.
pub fn batch(items: &[(&str, &[OperationKind])]) -> Batch {
    let selection = Selection {
        items: items
            .iter()
            .map(|(vm, ops)| SelectionItem {
                vm: (*vm).to_owned(),
                ops: ops.to_vec(),
                snapshot_name: None,
                revert_name: None,
            })
            .collect(),
        snapshot_name: None,
        revert_name: Some("golden".to_owned()),
        confirmation: Some("delete".to_owned()),
    };
    Batch::build(&selection).expect("valid batch")
}

// ── Scripted session client ───────────────────────────────────────────────────

/// One scripted answer for an `execute_one` call, consumed in order.
#[derive(Debug, Clone)]
pub enum UnitReply {
    Success,
    Error(&'static str),
    Critical(&'static str),
    Transport(&'static str),
    Remote(&'static str),
}

/// Everything the orchestrator did, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start,
    Execute(String, OperationKind),
    Finish,
    Cancel,
}

/// Scriptable `SessionClient` that records every call.
///
/// `cancel_after` requests cancellation on the attached handle once that
/// many execute calls have completed — simulating the user pressing Ctrl-C
/// while unit *k* is in flight.
pub struct ScriptedClient {
    pub calls: Mutex<Vec<Call>>,
    replies: Mutex<VecDeque<UnitReply>>,
    start_failure: Option<String>,
    finish_failure: Option<String>,
    finish_report: FinishReport,
    cancel_after: Option<(usize, CancelHandle)>,
}

impl ScriptedClient {
    pub fn new(replies: &[UnitReply]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.to_vec().into()),
            start_failure: None,
            finish_failure: None,
            finish_report: FinishReport {
                status: RemoteStatus::Success,
                message: "Executed: all".to_owned(),
            },
            cancel_after: None,
        }
    }

    pub fn failing_start(message: &str) -> Self {
        let mut client = Self::new(&[]);
        client.start_failure = Some(message.to_owned());
        client
    }

    pub fn with_finish_failure(mut self, message: &str) -> Self {
        self.finish_failure = Some(message.to_owned());
        self
    }

    pub fn with_finish_report(mut self, status: RemoteStatus, message: &str) -> Self {
        self.finish_report = FinishReport { status, message: message.to_owned() };
        self
    }

    pub fn cancelling_after(mut self, executed_units: usize, handle: &CancelHandle) -> Self {
        self.cancel_after = Some((executed_units, handle.clone()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn executed_units(&self) -> Vec<(String, OperationKind)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Execute(vm, op) => Some((vm, op)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

impl SessionClient for ScriptedClient {
    async fn start(&self, _batch: &Batch) -> Result<SessionId, SessionError> {
        self.record(Call::Start);
        match &self.start_failure {
            Some(message) => Err(SessionError::Start(message.clone())),
            None => Ok(SessionId::new("sess-test")),
        }
    }

    async fn execute_one(
        &self,
        _session: &SessionId,
        item: &WorkItem,
        operation: OperationKind,
    ) -> Result<ExecuteOutcome, SessionError> {
        self.record(Call::Execute(item.vm_name.clone(), operation));

        if let Some((after, handle)) = &self.cancel_after {
            let executed = self
                .calls()
                .iter()
                .filter(|c| matches!(c, Call::Execute(..)))
                .count();
            if executed == *after {
                handle.request();
            }
        }

        let reply = self
            .replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(UnitReply::Success);
        match reply {
            UnitReply::Success => Ok(ExecuteOutcome { status: RemoteStatus::Success, message: None }),
            UnitReply::Error(m) => Ok(ExecuteOutcome {
                status: RemoteStatus::Error,
                message: Some(m.to_owned()),
            }),
            UnitReply::Critical(m) => Ok(ExecuteOutcome {
                status: RemoteStatus::CriticalError,
                message: Some(m.to_owned()),
            }),
            UnitReply::Transport(m) => Err(SessionError::Transport(m.to_owned())),
            UnitReply::Remote(m) => Err(SessionError::Remote(m.to_owned())),
        }
    }

    async fn finish(&self, _session: &SessionId) -> Result<FinishReport, SessionError> {
        self.record(Call::Finish);
        match &self.finish_failure {
            Some(message) => Err(SessionError::Transport(message.clone())),
            None => Ok(self.finish_report.clone()),
        }
    }

    async fn cancel(&self, _session: &SessionId) -> Result<(), SessionError> {
        self.record(Call::Cancel);
        Ok(())
    }
}

// ── Recording status sink ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub transitions: Mutex<Vec<(String, OperationKind, UnitStatus)>>,
    pub messages: Mutex<Vec<String>>,
    pub locks: Mutex<Vec<bool>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last projected status of a unit, if any transition was emitted.
    pub fn last_status(&self, vm: &str, op: OperationKind) -> Option<UnitStatus> {
        self.transitions
            .lock()
            .expect("lock")
            .iter()
            .rev()
            .find(|(v, o, _)| v == vm && *o == op)
            .map(|(_, _, s)| *s)
    }

    pub fn lock_events(&self) -> Vec<bool> {
        self.locks.lock().expect("lock").clone()
    }

    pub fn unit_messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }
}

impl StatusSink for RecordingSink {
    fn unit_status(&self, vm: &str, operation: OperationKind, status: UnitStatus) {
        self.transitions
            .lock()
            .expect("lock")
            .push((vm.to_owned(), operation, status));
    }

    fn unit_message(&self, _vm: &str, _operation: OperationKind, message: &str) {
        self.messages.lock().expect("lock").push(message.to_owned());
    }

    fn controls_locked(&self, locked: bool) {
        self.locks.lock().expect("lock").push(locked);
    }
}
