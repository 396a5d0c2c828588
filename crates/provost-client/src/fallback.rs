//! Ordered fallback across alternative queries for one logical source.
//!
//! Several record sets can be obtained more than one way (a dedicated
//! endpoint, or reconstructed from another set when that endpoint is
//! missing). The chain tries each candidate strictly in order and never
//! fails: exhaustion degrades to an empty result with every cause kept
//! for diagnostics.

use std::{future::Future, pin::Pin};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FetchError;

type RowsFuture<'a> =
  Pin<Box<dyn Future<Output = Result<Vec<Value>, FetchError>> + Send + 'a>>;

/// One way of obtaining the source's rows.
pub struct Candidate<'a> {
  label:        &'static str,
  /// An `Ok` with zero rows from this candidate is not taken as final;
  /// the chain moves on. Unset means empty is a legitimate answer.
  may_be_empty: bool,
  thunk:        Box<dyn FnOnce() -> RowsFuture<'a> + Send + 'a>,
}

impl<'a> Candidate<'a> {
  pub fn new<F, Fut>(label: &'static str, f: F) -> Self
  where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = Result<Vec<Value>, FetchError>> + Send + 'a,
  {
    Self {
      label,
      may_be_empty: false,
      thunk: Box::new(move || Box::pin(f())),
    }
  }

  /// Mark an empty `Ok` from this candidate as "keep looking".
  pub fn or_next_if_empty(mut self) -> Self {
    self.may_be_empty = true;
    self
  }
}

/// A failed candidate, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainCause {
  pub label: &'static str,
  pub error: FetchError,
}

/// What the chain produced: rows from the first usable candidate (empty
/// when all failed) plus the causes collected along the way.
#[derive(Debug, Default)]
pub struct ChainOutcome {
  pub rows:   Vec<Value>,
  pub causes: Vec<ChainCause>,
}

pub struct FallbackChain<'a> {
  candidates: Vec<Candidate<'a>>,
}

impl<'a> FallbackChain<'a> {
  pub fn new(candidates: Vec<Candidate<'a>>) -> Self {
    Self { candidates }
  }

  /// Evaluate candidates sequentially until one yields usable rows.
  pub async fn run(self) -> ChainOutcome {
    let mut outcome = ChainOutcome::default();
    let last = self.candidates.len().saturating_sub(1);

    for (i, candidate) in self.candidates.into_iter().enumerate() {
      debug!(candidate = candidate.label, "trying source candidate");
      match (candidate.thunk)().await {
        Ok(rows) if rows.is_empty() && candidate.may_be_empty && i < last => {
          debug!(
            candidate = candidate.label,
            "candidate returned no rows, continuing"
          );
        }
        Ok(rows) => {
          outcome.rows = rows;
          return outcome;
        }
        Err(error) => {
          warn!(
            candidate = candidate.label,
            %error,
            "source candidate failed"
          );
          outcome.causes.push(ChainCause {
            label: candidate.label,
            error,
          });
        }
      }
    }
    outcome
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
