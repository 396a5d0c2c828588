//! Error types for `provost-wire`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The record carried neither a numeric id nor a usable email, so no
  /// identity can be assigned.
  #[error("record has no id and no usable email")]
  NoIdentity,

  /// The payload was not a JSON object.
  #[error("expected a JSON object, got {0}")]
  NotAnObject(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
