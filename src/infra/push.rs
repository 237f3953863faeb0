//! Out-of-band status push channel.
//!
//! The executor streams progress events over SSE (`/api/operation-updates`)
//! for operations whose progress outlives the synchronous call/response,
//! long-running clones in particular. The listener only ever writes to the
//! [`StatusBoard`]; orchestrator control state is never touched, so the two
//! concurrent flows stay race-free by construction.

use std::sync::Arc;

use futures_util::StreamExt as _;
use serde::Deserialize;

use crate::domain::operation::OperationKind;
use crate::domain::status::{StatusBoard, UnitStatus};

/// One push event as sent on the wire.
#[derive(Debug, Deserialize)]
struct PushEvent {
    /// `"<vmName>_<opName>"`.
    operation: String,
    status: UnitStatus,
}

/// Parse one SSE line into a status update.
///
/// Only `data:` lines carry events; everything else (comments, blank
/// keep-alives, event ids) is ignored. The unit key splits on the *last*
/// underscore: operation names never contain one, VM names may.
fn parse_event_line(line: &str) -> Option<(String, OperationKind, UnitStatus)> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        return None;
    }
    let event: PushEvent = serde_json::from_str(payload).ok()?;
    let (vm, op_name) = event.operation.rsplit_once('_')?;
    let op = OperationKind::from_wire_name(op_name)?;
    Some((vm.to_owned(), op, event.status))
}

/// Consume the push stream for the lifetime of the process, applying every
/// event to the board. Reconnects on stream loss: the channel is advisory
/// and must outlive individual batches. Callers abort the task to stop it.
pub async fn run(http: reqwest::Client, base_url: String, board: Arc<StatusBoard>) {
    let url = format!("{}/api/operation-updates", base_url.trim_end_matches('/'));
    loop {
        if let Ok(response) = http.get(&url).send().await {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();
            while let Some(Ok(chunk)) = stream.next().await {
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    if let Some((vm, op, status)) = parse_event_line(line.trim_end()) {
                        board.apply(&vm, op, status);
                    }
                }
            }
        }
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    }
}
