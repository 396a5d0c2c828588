//! Normalization of raw backend payloads into canonical
//! [`Appointee`](provost_core::appointee::Appointee) records.
//!
//! Three sources feed the lifecycle view (pending requests, active
//! records, the retirement archive) and each has its own field names,
//! nesting, and data hygiene problems. This crate owns all of that:
//! callers hand over `serde_json::Value` rows and get back clean records
//! or a per-row error, never a panic.

mod error;
mod fields;
mod normalize;

pub use self::error::{Error, Result};
pub use self::fields::clean_email;

use provost_core::appointee::Appointee;
use serde_json::Value;

// ─── Sources ─────────────────────────────────────────────────────────────────

/// Which backend collection a row came from. Drives the default lifecycle
/// classification and the source-specific field fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
  /// Appointment requests, including ones already reviewed.
  Requests,
  /// The dedicated active-records collection.
  Actives,
  /// The retirement archive (also holds rejected applications).
  Retired,
}

impl SourceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      SourceKind::Requests => "requests",
      SourceKind::Actives => "actives",
      SourceKind::Retired => "retired",
    }
  }
}

// ─── Payload shapes ──────────────────────────────────────────────────────────

/// Pull the row array out of a response body. The backends answer either
/// with a bare array or with a `{ "success": …, "data": [...] }` envelope;
/// anything else yields no rows.
pub fn extract_rows(body: &Value) -> Vec<Value> {
  match body {
    Value::Array(rows) => rows.clone(),
    Value::Object(map) => match map.get("data") {
      Some(Value::Array(rows)) => rows.clone(),
      _ => Vec::new(),
    },
    _ => Vec::new(),
  }
}

// ─── Batch normalization ─────────────────────────────────────────────────────

/// A row that could not be normalized, kept with its position for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
  pub index: usize,
  pub error: Error,
}

/// The usable records from one source fetch plus whatever had to be
/// dropped. One bad row never poisons the batch.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
  pub appointees: Vec<Appointee>,
  pub skipped:    Vec<SkippedRow>,
}

/// Normalize a single row from `kind`.
pub fn normalize_row(kind: SourceKind, raw: &Value) -> Result<Appointee> {
  normalize::normalize_one(kind, raw)
}

/// Normalize every row from `kind`, collecting failures instead of
/// aborting.
pub fn normalize_rows(kind: SourceKind, rows: &[Value]) -> NormalizedBatch {
  let mut batch = NormalizedBatch::default();
  for (index, raw) in rows.iter().enumerate() {
    match normalize::normalize_one(kind, raw) {
      Ok(appointee) => batch.appointees.push(appointee),
      Err(error) => batch.skipped.push(SkippedRow { index, error }),
    }
  }
  batch
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn extract_rows_handles_both_shapes() {
    let bare = json!([{ "id": 1 }]);
    assert_eq!(extract_rows(&bare).len(), 1);

    let envelope = json!({ "success": true, "count": 2, "data": [{}, {}] });
    assert_eq!(extract_rows(&envelope).len(), 2);

    assert!(extract_rows(&json!({ "detail": "error" })).is_empty());
    assert!(extract_rows(&json!("nope")).is_empty());
  }

  #[test]
  fn bad_rows_are_skipped_not_fatal() {
    let rows = vec![
      json!({ "id": 1, "name": "A" }),
      json!({ "name": "no identity" }),
      json!({ "id": 2, "name": "B" }),
    ];
    let batch = normalize_rows(SourceKind::Requests, &rows);
    assert_eq!(batch.appointees.len(), 2);
    assert_eq!(batch.skipped.len(), 1);
    assert_eq!(batch.skipped[0].index, 1);
    assert_eq!(batch.skipped[0].error, Error::NoIdentity);
  }
}
