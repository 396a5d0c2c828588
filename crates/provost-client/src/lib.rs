//! Client-side lifecycle engine for HOD (head-of-department)
//! appointments.
//!
//! Three backend collections — pending requests, active records, and the
//! retirement archive — disagree on shape and occasionally on facts.
//! [`LifecycleEngine`] fetches all three concurrently, runs each through
//! its fallback chain, normalizes, and reconciles them into one
//! deterministic view. Transitions validate against the pure state
//! machine in `provost-core` before anything touches the network.

mod error;
mod executor;
mod fallback;
mod source;

pub use self::{
  error::{ExecutionError, FetchError, Result},
  executor::TransitionExecutor,
  fallback::{Candidate, ChainCause, ChainOutcome, FallbackChain},
  source::{SourceClient, SourceConfig},
};

use std::{
  collections::BTreeMap,
  sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
  },
};

use chrono::NaiveDate;
use provost_core::{
  appointee::{Appointee, Identity},
  lifecycle::{Action, TransitionPayload},
  reconcile::reconcile,
  view::{ViewStats, search, stats},
};
use provost_wire::{NormalizedBatch, SourceKind, normalize_rows};
use tracing::info;

// ─── View ────────────────────────────────────────────────────────────────────

/// One reconciled lifecycle view. A degraded source shows up as missing
/// records plus a [`SourceDegradation`] entry, never as an error.
#[derive(Debug, Clone, Default)]
pub struct LifecycleView {
  pub appointees: BTreeMap<Identity, Appointee>,
  pub degraded:   Vec<SourceDegradation>,
}

/// Diagnostics for a source that contributed less than it should have.
#[derive(Debug, Clone)]
pub struct SourceDegradation {
  pub source:       SourceKind,
  /// One entry per failed candidate, in the order they were tried.
  pub causes:       Vec<String>,
  /// Rows the normalizer had to drop.
  pub skipped_rows: usize,
}

struct EngineState {
  view:       BTreeMap<Identity, Appointee>,
  generation: u64,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Facade over fetch, normalization, reconciliation, and transition
/// execution. Holds the latest completed view so transitions can be
/// validated against current state.
pub struct LifecycleEngine {
  client:   SourceClient,
  executor: TransitionExecutor,
  state:    Mutex<EngineState>,
  tickets:  AtomicU64,
}

impl LifecycleEngine {
  pub fn new(config: SourceConfig) -> Result<Self, FetchError> {
    let client = SourceClient::new(config)?;
    Ok(Self {
      executor: TransitionExecutor::new(client.clone()),
      client,
      state: Mutex::new(EngineState {
        view:       BTreeMap::new(),
        generation: 0,
      }),
      tickets: AtomicU64::new(0),
    })
  }

  // ── Reconciled view ───────────────────────────────────────────────────────

  /// Fetch all three sources concurrently and reconcile them. Never
  /// fails: every fetch problem degrades to an empty portion of the
  /// view with its causes recorded.
  ///
  /// Passes may overlap; the engine keeps whichever completed view is
  /// newest by start order, so a stale pass finishing late cannot
  /// clobber a fresher one.
  pub async fn lifecycle_view(&self) -> LifecycleView {
    let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;

    let (requests, actives, retired) = tokio::join!(
      self.fetch_requests(),
      self.fetch_actives(),
      self.fetch_retired(),
    );

    let mut degraded = Vec::new();
    let requests = take_batch(SourceKind::Requests, requests, &mut degraded);
    let actives = take_batch(SourceKind::Actives, actives, &mut degraded);
    let retired = take_batch(SourceKind::Retired, retired, &mut degraded);

    let appointees = reconcile(requests, actives, retired);
    info!(
      records = appointees.len(),
      degraded_sources = degraded.len(),
      "reconciliation pass complete"
    );

    {
      let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
      if ticket > state.generation {
        state.view = appointees.clone();
        state.generation = ticket;
      }
    }
    LifecycleView {
      appointees,
      degraded,
    }
  }

  async fn fetch_requests(&self) -> (NormalizedBatch, Vec<ChainCause>) {
    let client = self.client.clone();
    let outcome = FallbackChain::new(vec![Candidate::new(
      "GET /hod-requests",
      move || async move { client.get_rows("/hod-requests").await },
    )])
    .run()
    .await;
    (normalize_rows(SourceKind::Requests, &outcome.rows), outcome.causes)
  }

  async fn fetch_actives(&self) -> (NormalizedBatch, Vec<ChainCause>) {
    let primary = self.client.clone();
    let legacy = self.client.clone();
    let outcome = FallbackChain::new(vec![
      // An empty answer from the dedicated endpoint is final: nobody
      // is serving. Approval alone never makes someone active.
      Candidate::new("GET /hod-records", move || async move {
        primary.get_rows("/hod-records").await
      }),
      // Older deployments have no dedicated records endpoint at all;
      // only when it fails is the active set reconstructed from
      // approved requests.
      Candidate::new("GET /hod-requests (approved)", move || async move {
        let rows = legacy.get_rows("/hod-requests").await?;
        Ok(
          rows
            .into_iter()
            .filter(|row| {
              row
                .get("status")
                .and_then(|s| s.as_str())
                .is_some_and(|s| s.eq_ignore_ascii_case("approved"))
            })
            .collect(),
        )
      }),
    ])
    .run()
    .await;
    (normalize_rows(SourceKind::Actives, &outcome.rows), outcome.causes)
  }

  async fn fetch_retired(&self) -> (NormalizedBatch, Vec<ChainCause>) {
    let client = self.client.clone();
    let outcome = FallbackChain::new(vec![Candidate::new(
      "GET /retired-hods",
      move || async move { client.get_rows("/retired-hods").await },
    )])
    .run()
    .await;
    (normalize_rows(SourceKind::Retired, &outcome.rows), outcome.causes)
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  /// Perform `action` on the appointee currently known under
  /// `identity`. Errors are surfaced verbatim; nothing is retried
  /// behind the caller's back.
  pub async fn request_transition(
    &self,
    identity: &Identity,
    action: Action,
    payload: &TransitionPayload,
  ) -> Result<Appointee, ExecutionError> {
    let appointee = self
      .lookup(identity)
      .ok_or_else(|| ExecutionError::UnknownAppointee(identity.clone()))?;

    let updated = self.executor.execute(&appointee, action, payload).await?;

    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(a) = state.view.get_mut(identity) {
      *a = updated.clone();
    }
    Ok(updated)
  }

  // ── Read helpers ──────────────────────────────────────────────────────────

  fn lookup(&self, identity: &Identity) -> Option<Appointee> {
    let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    state.view.get(identity).cloned()
  }

  /// Human-readable service period for one appointee, ending at their
  /// retirement date when recorded, else `today`.
  pub fn tenure_text(
    &self,
    identity: &Identity,
    today: NaiveDate,
  ) -> Option<String> {
    let a = self.lookup(identity)?;
    let end = a.retired_at.map(|t| t.date_naive()).unwrap_or(today);
    Some(provost_core::tenure::tenure_text(a.hire_date, end))
  }

  /// Dashboard counters over the latest completed view.
  pub fn stats(&self) -> ViewStats {
    let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    stats(&state.view)
  }

  /// Appointees in the latest completed view matching `term`.
  pub fn search(&self, term: &str) -> Vec<Appointee> {
    let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    search(&state.view, term).into_iter().cloned().collect()
  }
}

fn take_batch(
  source: SourceKind,
  (batch, causes): (NormalizedBatch, Vec<ChainCause>),
  degraded: &mut Vec<SourceDegradation>,
) -> Vec<Appointee> {
  if !causes.is_empty() || !batch.skipped.is_empty() {
    degraded.push(SourceDegradation {
      source,
      causes: causes
        .iter()
        .map(|c| format!("{}: {}", c.label, c.error))
        .collect(),
      skipped_rows: batch.skipped.len(),
    });
  }
  batch.appointees
}

#[cfg(test)]
mod tests;
