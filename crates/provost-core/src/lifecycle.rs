//! The lifecycle state machine.
//!
//! A single pure function, [`transition`], owns the table of valid
//! `(state, action)` pairs. It performs no I/O; remote execution wraps it.
//! Keeping the table in one place means no consumer ever re-derives "can I
//! retire this person" from ad-hoc fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::appointee::LifecycleStatus;

// ─── Actions ─────────────────────────────────────────────────────────────────

/// A requested lifecycle transition.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Approve,
  Reject,
  Activate,
  Deactivate,
  Retire,
}

impl Action {
  /// The action string sent on the wire.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Approve => "approve",
      Self::Reject => "reject",
      Self::Activate => "activate",
      Self::Deactivate => "deactivate",
      Self::Retire => "retire",
    }
  }
}

impl std::fmt::Display for Action {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Action {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "approve" => Ok(Self::Approve),
      "reject" => Ok(Self::Reject),
      "activate" => Ok(Self::Activate),
      "deactivate" => Ok(Self::Deactivate),
      "retire" => Ok(Self::Retire),
      other => Err(format!("unknown action: {other:?}")),
    }
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// Caller-supplied context for a transition. All fields optional; the table
/// decides which ones a given action needs.
#[derive(Debug, Clone, Default)]
pub struct TransitionPayload {
  /// Free-text reason, recorded on reject / deactivate / retire.
  pub reason:     Option<String>,
  /// The appointee's assigned department, required to activate.
  pub department: Option<String>,
  /// Hire date, advisory for retire (without it tenure reads "N/A").
  pub hire_date:  Option<NaiveDate>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A transition the table does not admit. Always a local logic error; never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
  #[error("action {action:?} is not valid from state {from}")]
  Undefined { from: LifecycleStatus, action: Action },

  #[error("cannot activate an appointee with no assigned department")]
  DepartmentRequired,
}

// ─── Transition table ────────────────────────────────────────────────────────

/// Validate `action` against `current` and return the new state.
///
/// | From     | Action     | To          | Precondition          |
/// |----------|------------|-------------|-----------------------|
/// | Pending  | approve    | Approved    |                       |
/// | Pending  | reject     | Rejected    | reason optional       |
/// | Approved | activate   | Active      | department set        |
/// | Active   | deactivate | Deactivated | reason optional       |
/// | Active   | retire     | Retired     | hire date advisory    |
///
/// Rejected, Deactivated, and Retired are terminal.
pub fn transition(
  current: LifecycleStatus,
  action: Action,
  payload: &TransitionPayload,
) -> Result<LifecycleStatus, InvalidTransition> {
  use Action::*;
  use LifecycleStatus::*;

  match (current, action) {
    (Pending, Approve) => Ok(Approved),
    (Pending, Reject) => Ok(Rejected),
    (Approved, Activate) => {
      match payload.department.as_deref() {
        Some(d) if !d.trim().is_empty() => Ok(Active),
        _ => Err(InvalidTransition::DepartmentRequired),
      }
    }
    (Active, Deactivate) => Ok(Deactivated),
    (Active, Retire) => Ok(Retired),
    (from, action) => Err(InvalidTransition::Undefined { from, action }),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
