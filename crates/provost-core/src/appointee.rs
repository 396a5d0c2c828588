//! The canonical appointee record and its deduplication key.
//!
//! The three remote record sets (registration requests, active records, the
//! retired archive) each describe the same people in different shapes. After
//! normalization they all collapse into [`Appointee`], keyed by [`Identity`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The deduplication key for an appointee.
///
/// A numeric record id is the preferred key. Records that arrive without one
/// (legacy rows, partially-serialised payloads) fall back to their email
/// address, trimmed and case-folded. [`Ord`] puts id-keyed entries before
/// email-keyed ones, which keeps reconciled views deterministically ordered.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Identity {
  Id(i64),
  Email(String),
}

impl Identity {
  /// Build an email-keyed identity with the canonical normalization
  /// (trim + ASCII lowercase).
  pub fn from_email(raw: &str) -> Self {
    Self::Email(raw.trim().to_ascii_lowercase())
  }

  pub fn numeric(&self) -> Option<i64> {
    match self {
      Self::Id(n) => Some(*n),
      Self::Email(_) => None,
    }
  }
}

impl std::fmt::Display for Identity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Id(n) => write!(f, "#{n}"),
      Self::Email(e) => write!(f, "{e}"),
    }
  }
}

// ─── Lifecycle status ────────────────────────────────────────────────────────

/// Where an appointee sits in the HOD lifecycle.
///
/// An appointee has exactly one authoritative status at any instant; the
/// reconciliation merge ([`crate::reconcile`]) enforces this across the three
/// overlapping source sets.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
  Pending,
  Approved,
  Rejected,
  Active,
  Deactivated,
  Retired,
}

impl LifecycleStatus {
  /// Terminal states admit no further transitions.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Rejected | Self::Deactivated | Self::Retired)
  }

  /// Archived-class states come from the retired/deactivated record set and
  /// always win a status conflict against `Active` (retirement is the more
  /// recent, more specific fact about the same person).
  pub fn is_archived(&self) -> bool {
    matches!(self, Self::Retired | Self::Deactivated | Self::Rejected)
  }

  /// The discriminant string used on the wire.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
      Self::Active => "active",
      Self::Deactivated => "deactivated",
      Self::Retired => "retired",
    }
  }
}

impl std::fmt::Display for LifecycleStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Appointee ───────────────────────────────────────────────────────────────

/// Placeholder for person fields the backend never supplied.
pub const NOT_AVAILABLE: &str = "N/A";

/// The canonical, post-normalization representation of a person with an HOD
/// appointment status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointee {
  pub identity: Identity,

  /// Defaults to `"N/A"` when the source omitted it.
  pub name:  String,
  pub email: String,
  pub phone: String,

  pub employee_id:     Option<String>,
  /// Resolved from an embedded department object or a flat string field.
  pub department_name: Option<String>,
  pub designation:     Option<String>,
  pub specialization:  Option<String>,

  pub experience_years: u32,
  pub hire_date:        Option<NaiveDate>,

  pub status: LifecycleStatus,

  pub requested_at: Option<DateTime<Utc>>,
  pub reviewed_at:  Option<DateTime<Utc>>,
  pub retired_at:   Option<DateTime<Utc>>,

  pub rejection_reason:  Option<String>,
  pub retirement_reason: Option<String>,

  /// URL into the external asset store; the engine never owns the bytes.
  pub image: Option<String>,
}

impl Appointee {
  /// A record with every optional field absent, for seeding normalization.
  pub fn blank(identity: Identity, status: LifecycleStatus) -> Self {
    Self {
      identity,
      name: NOT_AVAILABLE.to_string(),
      email: NOT_AVAILABLE.to_string(),
      phone: NOT_AVAILABLE.to_string(),
      employee_id: None,
      department_name: None,
      designation: None,
      specialization: None,
      experience_years: 0,
      hire_date: None,
      status,
      requested_at: None,
      reviewed_at: None,
      retired_at: None,
      rejection_reason: None,
      retirement_reason: None,
      image: None,
    }
  }

  /// The normalized email key, if this record carries a usable email.
  pub fn email_key(&self) -> Option<Identity> {
    if self.email == NOT_AVAILABLE || self.email.trim().is_empty() {
      None
    } else {
      Some(Identity::from_email(&self.email))
    }
  }

  /// Fill this record's gaps from `other` without overwriting anything this
  /// record already knows. Status and identity are never taken from `other`;
  /// conflict resolution owns those.
  pub fn fill_gaps_from(&mut self, other: &Self) {
    fn fill_str(dst: &mut String, src: &str) {
      if dst == NOT_AVAILABLE && src != NOT_AVAILABLE && !src.trim().is_empty()
      {
        *dst = src.to_string();
      }
    }
    fn fill_opt<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
      if dst.is_none() {
        *dst = src.clone();
      }
    }

    fill_str(&mut self.name, &other.name);
    fill_str(&mut self.email, &other.email);
    fill_str(&mut self.phone, &other.phone);
    fill_opt(&mut self.employee_id, &other.employee_id);
    fill_opt(&mut self.department_name, &other.department_name);
    fill_opt(&mut self.designation, &other.designation);
    fill_opt(&mut self.specialization, &other.specialization);
    fill_opt(&mut self.hire_date, &other.hire_date);
    fill_opt(&mut self.requested_at, &other.requested_at);
    fill_opt(&mut self.reviewed_at, &other.reviewed_at);
    fill_opt(&mut self.retired_at, &other.retired_at);
    fill_opt(&mut self.rejection_reason, &other.rejection_reason);
    fill_opt(&mut self.retirement_reason, &other.retirement_reason);
    fill_opt(&mut self.image, &other.image);
    if self.experience_years == 0 {
      self.experience_years = other.experience_years;
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
