//! Service-period arithmetic and formatting.
//!
//! The whole-day span between hire and end is converted with a 365-day year
//! and a 30-day month. This matches the source system's own convention; it is
//! an approximation, not calendar arithmetic, and tests pin it as such.

use chrono::NaiveDate;

/// A service period broken into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenure {
  pub years:  u64,
  pub months: u64,
  pub days:   u64,
}

impl Tenure {
  /// Total whole days between the two dates (absolute, never negative).
  pub fn total_days(&self) -> u64 {
    self.years * 365 + self.months * 30 + self.days
  }
}

/// Compute the tenure between `hire` and `end`.
pub fn tenure(hire: NaiveDate, end: NaiveDate) -> Tenure {
  let total = (end - hire).num_days().unsigned_abs();
  let years = total / 365;
  let rem = total % 365;
  Tenure {
    years,
    months: rem / 30,
    days: rem % 30,
  }
}

fn plural(n: u64, unit: &str) -> String {
  if n == 1 {
    format!("{n} {unit}")
  } else {
    format!("{n} {unit}s")
  }
}

/// Render a tenure as the dashboard does: the two most significant non-empty
/// units, largest first.
pub fn format_tenure(t: Tenure) -> String {
  if t.years > 0 {
    format!("{}, {}", plural(t.years, "year"), plural(t.months, "month"))
  } else if t.months > 0 {
    format!("{}, {}", plural(t.months, "month"), plural(t.days, "day"))
  } else {
    plural(t.days, "day")
  }
}

/// Human-readable service period, `"N/A"` when the hire date was never
/// recorded. `end` is the retirement date when known, otherwise the caller's
/// "now" — no clock is read here.
pub fn tenure_text(hire: Option<NaiveDate>, end: NaiveDate) -> String {
  match hire {
    Some(h) => format_tenure(tenure(h, end)),
    None => "N/A".to_string(),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
