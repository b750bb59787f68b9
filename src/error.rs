// src/error.rs

//! Defines the error types surfaced by the sync controller.

use thiserror::Error;

/// Errors that can occur while tokenizing and parsing a `synchronous_standby_names`
/// value. Carries enough detail (token kind, lexeme, byte offset) to log a useful
/// warning; never propagated past the controller boundary (see [`SyncCtlError`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SsnParseError {
    #[error("unexpected token {kind} {lexeme:?} at offset {offset}")]
    UnexpectedToken {
        kind: &'static str,
        lexeme: String,
        offset: usize,
    },

    #[error("expected comma at offset {offset}, found {kind} {lexeme:?}")]
    ExpectedComma {
        kind: &'static str,
        lexeme: String,
        offset: usize,
    },

    #[error("trailing comma at offset {offset}")]
    TrailingComma { offset: usize },
}

/// The top-level error type for the sync controller.
///
/// Parse errors never reach this type: [`crate::controller::SyncController`]
/// catches them internally, logs a warning, and falls back to the empty SSN
/// value, per the controller's deliberately permissive error policy.
#[derive(Error, Debug)]
pub enum SyncCtlError<E> {
    /// A collaborator (database client) call failed. Propagated unchanged;
    /// the controller makes no partial state update when this occurs.
    #[error("database collaborator error: {0}")]
    Database(#[source] E),
}
