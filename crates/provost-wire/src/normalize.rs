//! Per-source mappings from raw JSON rows to canonical [`Appointee`]s.

use provost_core::appointee::{Appointee, Identity, LifecycleStatus};
use serde_json::Value;

use crate::{
  SourceKind,
  error::{Error, Result},
  fields,
};

// ─── Shared attribute paths ──────────────────────────────────────────────────

const ID_PATHS: &[&str] = &["id", "hod_id", "pk"];
const NAME_PATHS: &[&str] = &["name", "full_name", "user.name"];
const EMAIL_PATHS: &[&str] = &["email", "user.email", "user_email"];
const PHONE_PATHS: &[&str] = &["phone", "phone_number"];
const DEPARTMENT_PATHS: &[&str] =
  &["department.name", "department_name", "department"];
const IMAGE_PATHS: &[&str] = &["image", "image_url"];

fn parse_status(s: &str) -> Option<LifecycleStatus> {
  match s.trim().to_ascii_lowercase().as_str() {
    "pending" | "pending_approval" => Some(LifecycleStatus::Pending),
    "approved" | "account_created" => Some(LifecycleStatus::Approved),
    "rejected" => Some(LifecycleStatus::Rejected),
    "active" => Some(LifecycleStatus::Active),
    "deactivated" => Some(LifecycleStatus::Deactivated),
    "retired" => Some(LifecycleStatus::Retired),
    _ => None,
  }
}

// ─── Core mapping ────────────────────────────────────────────────────────────

pub(crate) fn normalize_one(kind: SourceKind, raw: &Value) -> Result<Appointee> {
  if !raw.is_object() {
    return Err(Error::NotAnObject(raw.to_string()));
  }

  let email = fields::first_email(raw, EMAIL_PATHS);

  // Prefer the numeric id; fall back to the cleaned email as the key.
  let identity = match fields::first_i64(raw, ID_PATHS) {
    Some(id) => Identity::Id(id),
    None => match &email {
      Some(e) => Identity::from_email(e),
      None => return Err(Error::NoIdentity),
    },
  };

  let mut a = Appointee::blank(identity, default_status(kind));

  if let Some(name) = fields::first_string(raw, NAME_PATHS) {
    a.name = name;
  }
  if let Some(email) = email {
    a.email = email;
  }
  if let Some(phone) = fields::first_string(raw, PHONE_PATHS) {
    a.phone = phone;
  }
  a.employee_id = fields::first_string(raw, &["employee_id"]);
  a.department_name = fields::first_string(raw, DEPARTMENT_PATHS);
  a.designation = fields::first_string(raw, &["designation"]);
  a.specialization = fields::first_string(raw, &["specialization"]);
  a.experience_years = fields::first_i64(raw, &["experience_years"])
    .and_then(|n| u32::try_from(n).ok())
    .unwrap_or(0);
  a.image = fields::first_string(raw, IMAGE_PATHS);

  a.requested_at =
    fields::first_datetime(raw, &["requested_at", "created_at"]);
  a.reviewed_at = fields::first_datetime(raw, &["reviewed_at"]);

  match kind {
    SourceKind::Requests => {
      if let Some(s) = fields::first_string(raw, &["status"])
        && let Some(status) = parse_status(&s)
      {
        a.status = status;
      }
      a.hire_date = fields::first_date(raw, &["hire_date"]);
      a.rejection_reason = fields::first_string(raw, &["rejection_reason"]);
    }
    SourceKind::Actives => {
      // The dedicated records endpoint serves `reviewed_at` as the hire
      // date when no explicit one was recorded.
      a.hire_date =
        fields::first_date(raw, &["hire_date", "reviewed_at"]);
      // A row the source itself flagged inactive keeps an archived
      // classification; the merge will not force it back to Active.
      if fields::first_bool(raw, &["is_active"]) == Some(false) {
        a.status = LifecycleStatus::Retired;
      } else if let Some(s) = fields::first_string(raw, &["status"])
        && let Some(status) = parse_status(&s)
        && status.is_archived()
      {
        a.status = status;
      }
    }
    SourceKind::Retired => {
      a.hire_date = fields::first_date(raw, &["hire_date"]);
      if let Some(s) = fields::first_string(raw, &["status"])
        && let Some(status) = parse_status(&s)
        && status.is_archived()
      {
        a.status = status;
      }
      a.retired_at = fields::first_datetime(
        raw,
        &["retired_at", "retired_date", "updated_at"],
      );
      a.retirement_reason = fields::first_string(
        raw,
        &["retirement_reason", "rejection_reason"],
      );
    }
  }

  Ok(a)
}

fn default_status(kind: SourceKind) -> LifecycleStatus {
  match kind {
    SourceKind::Requests => LifecycleStatus::Pending,
    SourceKind::Actives => LifecycleStatus::Active,
    SourceKind::Retired => LifecycleStatus::Retired,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
