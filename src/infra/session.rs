//! Infrastructure implementation of the `SessionClient` port.
//!
//! Speaks the executor's HTTP+JSON session protocol. Error classification
//! is explicit: request-level failures (connect, timeout) surface as
//! `SessionError::Transport` and abort the batch, while a response the
//! executor did produce, whatever its HTTP status, is parsed for a
//! protocol outcome and only fails the one unit.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::application::ports::{ExecuteOutcome, FinishReport, SessionClient, SessionId};
use crate::domain::batch::{Batch, WorkItem};
use crate::domain::error::SessionError;
use crate::domain::operation::OperationKind;

/// Production `SessionClient` backed by `reqwest`.
pub struct HttpSessionClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSessionClient {
    /// Build a client for the executor at `base_url`.
    ///
    /// Only the connect phase is bounded: individual operations (clone in
    /// particular) legitimately run for minutes, so the calls themselves
    /// carry no overall timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{name}", self.base_url)
    }
}

// ── Wire shapes ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StartRequest<'a> {
    #[serde(rename = "vmOperations")]
    vm_operations: Vec<VmOperations<'a>>,
}

#[derive(Serialize)]
struct VmOperations<'a> {
    vm: &'a str,
    operations: &'a [OperationKind],
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    revert_name: Option<&'a str>,
}

#[derive(Deserialize)]
struct StartResponse {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    session_id: &'a str,
    vm_name: &'a str,
    operation: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    revert_name: Option<&'a str>,
}

#[derive(Serialize)]
struct SessionRef<'a> {
    session_id: &'a str,
}

// ── Classification helpers (pure, tested without a network) ───────────────────

/// Classify an `execute-operation` response body.
///
/// The executor reports `critical_error` outcomes with a 500 status, so the
/// body is parsed regardless of the HTTP status; only a body that cannot be
/// decoded at all falls back to a non-fatal call error.
fn classify_execute(status: StatusCode, body: &str) -> Result<ExecuteOutcome, SessionError> {
    match serde_json::from_str::<ExecuteOutcome>(body) {
        Ok(outcome) => Ok(outcome),
        Err(_) if !status.is_success() => Err(SessionError::Remote(status.to_string())),
        Err(err) => Err(SessionError::Protocol(err.to_string())),
    }
}

fn classify_finish(status: StatusCode, body: &str) -> Result<FinishReport, SessionError> {
    if !status.is_success() {
        return Err(SessionError::Remote(status.to_string()));
    }
    serde_json::from_str(body).map_err(|err| SessionError::Protocol(err.to_string()))
}

fn transport(err: &reqwest::Error) -> SessionError {
    SessionError::Transport(err.to_string())
}

impl SessionClient for HttpSessionClient {
    async fn start(&self, batch: &Batch) -> Result<SessionId, SessionError> {
        let request = StartRequest {
            vm_operations: batch
                .items()
                .iter()
                .map(|item| VmOperations {
                    vm: &item.vm_name,
                    operations: &item.operations,
                    snapshot_name: item.snapshot_name.as_deref(),
                    revert_name: item.revert_name.as_deref(),
                })
                .collect(),
        };

        let response = self
            .http
            .post(self.endpoint("start-operations"))
            .json(&request)
            .send()
            .await
            .map_err(|e| SessionError::Start(e.to_string()))?;

        let status = response.status();
        let body: StartResponse = response
            .json()
            .await
            .map_err(|e| SessionError::Start(e.to_string()))?;

        match body.session_id {
            Some(id) if status.is_success() => Ok(SessionId::new(id)),
            _ => Err(SessionError::Start(
                body.message.unwrap_or_else(|| status.to_string()),
            )),
        }
    }

    async fn execute_one(
        &self,
        session: &SessionId,
        item: &WorkItem,
        operation: OperationKind,
    ) -> Result<ExecuteOutcome, SessionError> {
        let request = ExecuteRequest {
            session_id: session.as_str(),
            vm_name: &item.vm_name,
            operation,
            snapshot_name: item.snapshot_name.as_deref(),
            revert_name: item.revert_name.as_deref(),
        };

        let response = self
            .http
            .post(self.endpoint("execute-operation"))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport(&e))?;
        classify_execute(status, &body)
    }

    async fn finish(&self, session: &SessionId) -> Result<FinishReport, SessionError> {
        let response = self
            .http
            .post(self.endpoint("finish-operations"))
            .json(&SessionRef { session_id: session.as_str() })
            .send()
            .await
            .map_err(|e| transport(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport(&e))?;
        classify_finish(status, &body)
    }

    async fn cancel(&self, session: &SessionId) -> Result<(), SessionError> {
        self.http
            .post(self.endpoint("cancel-operations"))
            .json(&SessionRef { session_id: session.as_str() })
            .send()
            .await
            .map_err(|e| transport(&e))?;
        Ok(())
    }
}
