//! Error types for `provost-client`.

use provost_core::lifecycle::{Action, InvalidTransition};
use thiserror::Error;

/// A single source fetch gone wrong. Transport, auth, and decoding
/// failures all land here; nothing escapes the client boundary as a raw
/// `reqwest` error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  #[error("unauthorized (401): token missing or expired")]
  Unauthorized,

  #[error("forbidden (403): token lacks permission")]
  Forbidden,

  #[error("endpoint not found (404)")]
  NotFound,

  #[error("server error ({status}): {message}")]
  ServerError { status: u16, message: String },

  #[error("malformed response: {0}")]
  Malformed(String),

  #[error("request timed out")]
  Timeout,

  #[error("transport error: {0}")]
  Transport(String),
}

impl From<reqwest::Error> for FetchError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      FetchError::Timeout
    } else if e.is_decode() {
      FetchError::Malformed(e.to_string())
    } else {
      FetchError::Transport(e.to_string())
    }
  }
}

/// A remote transition that could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
  /// The state machine rejected the transition before any request was
  /// sent.
  #[error("transition rejected locally: {0}")]
  ValidationRejected(#[from] InvalidTransition),

  /// No appointee with this identity in the current view, or the record
  /// carries no numeric id to address it with remotely.
  #[error("no addressable record for {0}")]
  UnknownAppointee(provost_core::appointee::Identity),

  /// An endpoint answered 401 or 403. Permission problems stop the
  /// candidate walk immediately; retrying elsewhere cannot fix them.
  #[error("permission denied by {endpoint}")]
  PermissionDenied { endpoint: String },

  /// Every candidate endpoint for the action failed.
  #[error("every endpoint for `{action}` failed: {}", .causes.join("; "))]
  AllCandidatesFailed { action: Action, causes: Vec<String> },
}

pub type Result<T, E = ExecutionError> = std::result::Result<T, E>;
