//! Unit tests for the `run_batch` application service.
//!
//! Each test scripts the session client's answers and asserts the exact
//! sequence of protocol calls, the projected unit statuses, and the lock
//! bracket around the run.

#![allow(clippy::expect_used)]

use vmfleet::application::cancel::CancelHandle;
use vmfleet::application::ports::RemoteStatus;
use vmfleet::application::services::executor::{BatchOutcome, run_batch};
use vmfleet::domain::operation::OperationKind::{Delete, Poweroff, Poweron, Snapshot};
use vmfleet::domain::status::UnitStatus;

use crate::helpers::{Call, RecordingSink, ScriptedClient, UnitReply, batch};

#[tokio::test]
async fn happy_path_executes_every_unit_and_finishes() {
    let batch = batch(&[("alpha", &[Poweroff, Poweron]), ("beta", &[Snapshot])]);
    let client = ScriptedClient::new(&[]);
    let sink = RecordingSink::new();
    let cancel = CancelHandle::new();

    let outcome = run_batch(&client, &sink, &cancel, &batch)
        .await
        .expect("outcome");

    assert!(matches!(outcome, BatchOutcome::Completed { .. }));
    assert!(!outcome.is_error());
    assert_eq!(
        client.executed_units(),
        vec![
            ("alpha".to_owned(), Poweroff),
            ("alpha".to_owned(), Poweron),
            ("beta".to_owned(), Snapshot),
        ]
    );
    assert_eq!(
        client.calls().first().cloned(),
        Some(Call::Start),
        "start opens the session"
    );
    assert_eq!(
        client.calls().last().cloned(),
        Some(Call::Finish),
        "finish closes the session"
    );
    assert!(!client.calls().contains(&Call::Cancel));
    assert_eq!(sink.last_status("alpha", Poweroff), Some(UnitStatus::Success));
    assert_eq!(sink.last_status("beta", Snapshot), Some(UnitStatus::Success));
}

#[tokio::test]
async fn units_execute_in_selection_then_priority_order() {
    // Selected out of order on purpose: delete must run before poweron
    // within the same VM, and VMs keep their selection order.
    let batch = batch(&[("beta", &[Poweron, Delete]), ("alpha", &[Poweroff])]);
    let client = ScriptedClient::new(&[]);
    let sink = RecordingSink::new();

    run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect("outcome");

    assert_eq!(
        client.executed_units(),
        vec![
            ("beta".to_owned(), Delete),
            ("beta".to_owned(), Poweron),
            ("alpha".to_owned(), Poweroff),
        ]
    );
}

#[tokio::test]
async fn a_unit_error_never_stops_the_batch() {
    let batch = batch(&[("alpha", &[Poweroff]), ("beta", &[Poweroff]), ("gamma", &[Poweroff])]);
    let client = ScriptedClient::new(&[
        UnitReply::Success,
        UnitReply::Error("VM beta not found"),
        UnitReply::Success,
    ]);
    let sink = RecordingSink::new();

    let outcome = run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect("outcome");

    assert!(matches!(outcome, BatchOutcome::Completed { .. }));
    assert_eq!(client.executed_units().len(), 3, "all units still execute");
    assert!(client.calls().contains(&Call::Finish));
    assert!(!client.calls().contains(&Call::Cancel));
    assert_eq!(sink.last_status("beta", Poweroff), Some(UnitStatus::Error));
    assert_eq!(sink.last_status("gamma", Poweroff), Some(UnitStatus::Success));
    assert_eq!(sink.unit_messages(), vec!["VM beta not found".to_owned()]);
}

#[tokio::test]
async fn a_nonfatal_client_error_also_continues() {
    let batch = batch(&[("alpha", &[Poweroff]), ("beta", &[Poweroff])]);
    let client = ScriptedClient::new(&[UnitReply::Remote("502 Bad Gateway"), UnitReply::Success]);
    let sink = RecordingSink::new();

    let outcome = run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect("outcome");

    assert!(matches!(outcome, BatchOutcome::Completed { .. }));
    assert_eq!(client.executed_units().len(), 2);
    assert_eq!(sink.last_status("alpha", Poweroff), Some(UnitStatus::Error));
    assert!(client.calls().contains(&Call::Finish));
}

#[tokio::test]
async fn a_critical_error_aborts_and_cancels_the_session() {
    // Scenario from the design review: A powers off fine, B reports a
    // critical executor failure.
    let batch = batch(&[("A", &[Poweroff]), ("B", &[Poweroff]), ("C", &[Poweroff])]);
    let client = ScriptedClient::new(&[
        UnitReply::Success,
        UnitReply::Critical("control plane unreachable"),
    ]);
    let sink = RecordingSink::new();

    let outcome = run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect("outcome");

    match &outcome {
        BatchOutcome::Aborted { message } => assert_eq!(message, "control plane unreachable"),
        other => panic!("expected Aborted, got {other:?}"),
    }
    assert!(outcome.is_error());
    assert_eq!(
        client.executed_units(),
        vec![("A".to_owned(), Poweroff), ("B".to_owned(), Poweroff)],
        "no unit after the critical one executes"
    );
    assert!(client.calls().contains(&Call::Cancel));
    assert!(!client.calls().contains(&Call::Finish), "cancel replaces finish");
    assert_eq!(sink.last_status("A", Poweroff), Some(UnitStatus::Success));
    assert_eq!(sink.last_status("B", Poweroff), Some(UnitStatus::Error));
    assert_eq!(
        sink.last_status("C", Poweroff),
        Some(UnitStatus::Pending),
        "skipped units stay pending"
    );
}

#[tokio::test]
async fn a_transport_failure_is_as_fatal_as_a_critical_error() {
    let batch = batch(&[("alpha", &[Poweroff]), ("beta", &[Poweroff])]);
    let client = ScriptedClient::new(&[UnitReply::Transport("connection refused")]);
    let sink = RecordingSink::new();

    let outcome = run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect("outcome");

    assert!(matches!(outcome, BatchOutcome::Aborted { .. }));
    assert_eq!(client.executed_units().len(), 1);
    assert!(client.calls().contains(&Call::Cancel));
    assert!(!client.calls().contains(&Call::Finish));
    assert_eq!(sink.last_status("beta", Poweroff), Some(UnitStatus::Pending));
}

#[tokio::test]
async fn start_failure_attempts_no_units_and_sends_no_cancel() {
    let batch = batch(&[("alpha", &[Poweroff])]);
    let client = ScriptedClient::failing_start("503 Service Unavailable");
    let sink = RecordingSink::new();

    let err = run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect_err("expected Err");

    assert!(err.to_string().contains("starting operation session"));
    assert_eq!(client.calls(), vec![Call::Start], "session never existed");
    assert_eq!(sink.lock_events(), vec![true, false], "controls re-enabled");
}

#[tokio::test]
async fn cancellation_between_units_keeps_the_rest_pending_and_still_finishes() {
    let batch = batch(&[("alpha", &[Poweroff]), ("beta", &[Poweroff]), ("gamma", &[Poweroff])]);
    let cancel = CancelHandle::new();
    let client = ScriptedClient::new(&[]).cancelling_after(1, &cancel);
    let sink = RecordingSink::new();

    let outcome = run_batch(&client, &sink, &cancel, &batch)
        .await
        .expect("outcome");

    assert!(matches!(outcome, BatchOutcome::Cancelled { .. }));
    assert!(!outcome.is_error(), "user cancellation is not an error");
    assert_eq!(
        client.executed_units(),
        vec![("alpha".to_owned(), Poweroff)],
        "cancellation takes effect at the next unit boundary"
    );
    assert!(client.calls().contains(&Call::Finish), "finish still runs");
    assert!(!client.calls().contains(&Call::Cancel));
    assert!(
        sink.last_status("alpha", Poweroff)
            .expect("attempted unit has a status")
            .is_terminal(),
        "attempted units reach a terminal status"
    );
    assert_eq!(sink.last_status("alpha", Poweroff), Some(UnitStatus::Success));
    assert_eq!(sink.last_status("beta", Poweroff), Some(UnitStatus::Pending));
    assert_eq!(sink.last_status("gamma", Poweroff), Some(UnitStatus::Pending));
}

#[tokio::test]
async fn cancellation_before_the_first_unit_still_finishes_the_session() {
    let batch = batch(&[("alpha", &[Poweroff])]);
    let cancel = CancelHandle::new();
    cancel.request();
    cancel.request(); // idempotent
    let client = ScriptedClient::new(&[]);
    let sink = RecordingSink::new();

    let outcome = run_batch(&client, &sink, &cancel, &batch)
        .await
        .expect("outcome");

    assert!(matches!(outcome, BatchOutcome::Cancelled { .. }));
    assert!(client.executed_units().is_empty());
    assert_eq!(
        client.calls(),
        vec![Call::Start, Call::Finish],
        "the validly started session still gets its summary"
    );
}

#[tokio::test]
async fn an_error_summary_flags_the_completed_outcome_as_an_error() {
    let batch = batch(&[("alpha", &[Poweroff])]);
    let client = ScriptedClient::new(&[UnitReply::Error("boom")])
        .with_finish_report(RemoteStatus::Error, "Executed: 0 of 1, errors: 1");
    let sink = RecordingSink::new();

    let outcome = run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect("outcome");

    match &outcome {
        BatchOutcome::Completed { summary } => {
            assert_eq!(summary.message, "Executed: 0 of 1, errors: 1");
        }
        other => panic!("expected Completed, got {other:?}"),
    }
    assert!(outcome.is_error());
}

#[tokio::test]
async fn a_failed_finish_releases_the_session_through_cancel() {
    let batch = batch(&[("alpha", &[Poweroff])]);
    let client = ScriptedClient::new(&[]).with_finish_failure("connection reset");
    let sink = RecordingSink::new();

    let err = run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect_err("expected Err");

    assert!(err.to_string().contains("finishing operation session"));
    assert_eq!(
        client.calls(),
        vec![
            Call::Start,
            Call::Execute("alpha".to_owned(), Poweroff),
            Call::Finish,
            Call::Cancel,
        ]
    );
}

#[tokio::test]
async fn controls_are_locked_for_the_run_and_unlocked_on_every_path() {
    for replies in [
        vec![],
        vec![UnitReply::Critical("down")],
        vec![UnitReply::Transport("refused")],
    ] {
        let batch = batch(&[("alpha", &[Poweroff])]);
        let client = ScriptedClient::new(&replies);
        let sink = RecordingSink::new();
        run_batch(&client, &sink, &CancelHandle::new(), &batch)
            .await
            .expect("outcome");
        assert_eq!(sink.lock_events(), vec![true, false], "replies: {replies:?}");
    }
}

#[tokio::test]
async fn every_unit_is_projected_to_pending_before_the_session_starts() {
    let batch = batch(&[("alpha", &[Poweroff, Poweron])]);
    let client = ScriptedClient::new(&[]);
    let sink = RecordingSink::new();

    run_batch(&client, &sink, &CancelHandle::new(), &batch)
        .await
        .expect("outcome");

    let transitions = sink.transitions.lock().expect("lock");
    assert_eq!(transitions[0], ("alpha".to_owned(), Poweroff, UnitStatus::Pending));
    assert_eq!(transitions[1], ("alpha".to_owned(), Poweron, UnitStatus::Pending));
}
