//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`, or
//! `crate::application`. All error types implement `thiserror::Error` and
//! convert to `anyhow::Error` via the `?` operator.

use thiserror::Error;

// ── Selection / batch-build errors ────────────────────────────────────────────

/// Errors that fail a batch build. None of these ever reaches the network:
/// a batch that fails validation never starts a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No VMs selected for operations.")]
    EmptySelection,

    #[error("No operations selected.")]
    NoOperationSelected,

    #[error(
        "Invalid snapshot name '{0}': only latin letters, digits, hyphens and underscores are allowed."
    )]
    InvalidName(String),

    #[error("A snapshot name is required to revert.")]
    MissingRevertName,

    #[error("Delete not confirmed. Type the word 'delete' to confirm removal.")]
    NotConfirmed,

    #[error("Unknown VM '{0}': not present in the inventory.")]
    UnknownVm(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },
}

// ── Session protocol errors ───────────────────────────────────────────────────

/// Errors surfaced by the session protocol client.
///
/// The variant carries the fatality classification the orchestrator needs:
/// a `Transport` failure means the executor itself is unreachable and the
/// whole batch must stop, while `Remote` and `Protocol` describe a single
/// failed call and never abort the batch on their own.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The start call failed; the session never existed.
    #[error("could not start operation session: {0}")]
    Start(String),

    /// Connectivity-level failure (connect, timeout, request aborted).
    #[error("executor unreachable: {0}")]
    Transport(String),

    /// The executor answered, but with a non-success HTTP status and no
    /// parseable protocol body.
    #[error("executor rejected the call: {0}")]
    Remote(String),

    /// The executor answered with a body the client could not decode.
    #[error("malformed executor response: {0}")]
    Protocol(String),
}

impl SessionError {
    /// `true` when the failure means the executor is unreachable and
    /// continuing the batch would only repeat the same failure.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Transport(_))
    }
}
