//! Read-side helpers over a reconciled view.
//!
//! Consumers read these instead of re-deriving counts or filters from the
//! raw source sets.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::appointee::{Appointee, Identity, LifecycleStatus};

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Dashboard counters computed from the canonical map, not trusted from a
/// separate stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewStats {
  pub active:           usize,
  pub pending_requests: usize,
  pub retired:          usize,
  /// Active HODs per department, alphabetical.
  pub department_wise:  BTreeMap<String, usize>,
}

pub fn stats(view: &BTreeMap<Identity, Appointee>) -> ViewStats {
  let mut out = ViewStats {
    active:           0,
    pending_requests: 0,
    retired:          0,
    department_wise:  BTreeMap::new(),
  };
  for a in view.values() {
    match a.status {
      LifecycleStatus::Active => {
        out.active += 1;
        if let Some(dept) = &a.department_name {
          *out.department_wise.entry(dept.clone()).or_insert(0) += 1;
        }
      }
      LifecycleStatus::Pending => out.pending_requests += 1,
      LifecycleStatus::Retired | LifecycleStatus::Deactivated => {
        out.retired += 1
      }
      LifecycleStatus::Approved | LifecycleStatus::Rejected => {}
    }
  }
  out
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Case-insensitive substring match over name, email, and department — the
/// search box semantics every record table shares.
pub fn matches_search(appointee: &Appointee, term: &str) -> bool {
  let term = term.trim().to_lowercase();
  if term.is_empty() {
    return true;
  }
  let hay = |s: &str| s.to_lowercase().contains(&term);
  hay(&appointee.name)
    || hay(&appointee.email)
    || appointee
      .department_name
      .as_deref()
      .is_some_and(hay)
}

/// Filter a view down to appointees matching `term`.
pub fn search<'a>(
  view: &'a BTreeMap<Identity, Appointee>,
  term: &str,
) -> Vec<&'a Appointee> {
  view.values().filter(|a| matches_search(a, term)).collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
