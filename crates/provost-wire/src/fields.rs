//! Low-level field extraction shared by every source mapping.
//!
//! The backends disagree on field names and shapes (`department.name` vs.
//! `department_name` vs. a flat `department` string), so each logical
//! attribute is resolved through one prioritized path list here instead of
//! ad-hoc probing at every call site.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

// ─── Path resolution ─────────────────────────────────────────────────────────

/// Walk a dotted path (`"department.name"`) into a JSON object.
fn value_at<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
  let mut cur = obj;
  for seg in path.split('.') {
    cur = cur.get(seg)?;
  }
  if cur.is_null() { None } else { Some(cur) }
}

/// First present, non-null, non-empty string among `paths`.
pub fn first_string(obj: &Value, paths: &[&str]) -> Option<String> {
  paths.iter().find_map(|p| {
    let v = value_at(obj, p)?;
    let s = v.as_str()?.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
  })
}

/// First present integer among `paths`. Tolerates numeric strings, which
/// some endpoints emit for form-encoded writes.
pub fn first_i64(obj: &Value, paths: &[&str]) -> Option<i64> {
  paths.iter().find_map(|p| {
    let v = value_at(obj, p)?;
    v.as_i64().or_else(|| v.as_str()?.trim().parse().ok())
  })
}

/// First present boolean among `paths`.
pub fn first_bool(obj: &Value, paths: &[&str]) -> Option<bool> {
  paths.iter().find_map(|p| value_at(obj, p)?.as_bool())
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// First parseable timestamp among `paths`. Accepts RFC 3339 and bare
/// `YYYY-MM-DD` (midnight UTC), the two shapes the backends emit.
pub fn first_datetime(obj: &Value, paths: &[&str]) -> Option<DateTime<Utc>> {
  paths.iter().find_map(|p| {
    let s = value_at(obj, p)?.as_str()?.trim();
    parse_datetime(s)
  })
}

/// First parseable calendar date among `paths`; timestamps are truncated to
/// their date part.
pub fn first_date(obj: &Value, paths: &[&str]) -> Option<NaiveDate> {
  paths.iter().find_map(|p| {
    let s = value_at(obj, p)?.as_str()?.trim();
    parse_date(s)
  })
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  // Some rows carry a date where a timestamp belongs.
  let d = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
  Some(d.and_hms_opt(0, 0, 0)?.and_utc())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(d);
  }
  DateTime::parse_from_rfc3339(s)
    .ok()
    .map(|dt| dt.with_timezone(&Utc).date_naive())
}

// ─── Email cleanup ───────────────────────────────────────────────────────────

/// Minimal HTML-entity decoder for the handful of entities the upstream
/// store actually leaks into text fields.
fn decode_html_entities(s: &str) -> String {
  s.replace("&amp;", "&")
    .replace("&#x27;", "'")
    .replace("&#39;", "'")
    .replace("&quot;", "\"")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
}

/// Recover a plain email address from the shapes observed in production:
/// a real JSON array, a stringified Python list (`"['a@b.com']"`), or an
/// HTML-entity-escaped string. Returns `None` when nothing usable remains.
pub fn clean_email(raw: &Value) -> Option<String> {
  let s = match raw {
    Value::Array(items) => items.first()?.as_str()?.to_string(),
    Value::String(s) => s.clone(),
    _ => return None,
  };

  let mut s = decode_html_entities(s.trim());

  if s.starts_with('[') {
    // A Python list serialised to a string. Single quotes block a direct
    // JSON parse, so swap them and fall back to stripping brackets.
    let jsonish = s.replace('\'', "\"");
    match serde_json::from_str::<Vec<String>>(&jsonish) {
      Ok(items) => s = items.into_iter().next().unwrap_or_default(),
      Err(_) => {
        s.retain(|c| !matches!(c, '[' | ']' | '\'' | '"'));
      }
    }
  }
  // Stray quoting survives on some rows even without brackets.
  s.retain(|c| !matches!(c, '[' | ']' | '\'' | '"'));

  let s = s.trim().to_string();
  if s.is_empty() { None } else { Some(s) }
}

/// Resolve an email attribute through `paths`, then clean it.
pub fn first_email(obj: &Value, paths: &[&str]) -> Option<String> {
  paths
    .iter()
    .find_map(|p| value_at(obj, p))
    .and_then(clean_email)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn path_priority_takes_first_present() {
    let obj = json!({
      "department": { "name": "Physics" },
      "department_name": "Chemistry",
    });
    let got =
      first_string(&obj, &["department.name", "department_name", "department"]);
    assert_eq!(got.as_deref(), Some("Physics"));
  }

  #[test]
  fn path_priority_falls_through_null_and_empty() {
    let obj = json!({ "department_name": null, "department": "Mathematics" });
    let got =
      first_string(&obj, &["department.name", "department_name", "department"]);
    assert_eq!(got.as_deref(), Some("Mathematics"));

    let obj = json!({ "department_name": "  " });
    assert_eq!(first_string(&obj, &["department_name"]), None);
  }

  #[test]
  fn numeric_strings_accepted() {
    let obj = json!({ "experience_years": "12" });
    assert_eq!(first_i64(&obj, &["experience_years"]), Some(12));
  }

  #[test]
  fn datetime_accepts_bare_dates() {
    let obj = json!({ "reviewed_at": "2023-06-01" });
    let dt = first_datetime(&obj, &["reviewed_at"]).unwrap();
    assert_eq!(dt.date_naive().to_string(), "2023-06-01");
  }

  #[test]
  fn date_truncates_timestamps() {
    let obj = json!({ "hire_date": "2020-01-15T09:30:00Z" });
    let d = first_date(&obj, &["hire_date"]).unwrap();
    assert_eq!(d.to_string(), "2020-01-15");
  }

  // ── Email hazards ─────────────────────────────────────────────────────────

  #[test]
  fn plain_email_passes_through() {
    assert_eq!(
      clean_email(&json!("a@b.com")).as_deref(),
      Some("a@b.com")
    );
  }

  #[test]
  fn stringified_python_list() {
    assert_eq!(
      clean_email(&json!("['a@b.com']")).as_deref(),
      Some("a@b.com")
    );
  }

  #[test]
  fn real_json_array() {
    assert_eq!(
      clean_email(&json!(["a@b.com", "b@c.com"])).as_deref(),
      Some("a@b.com")
    );
  }

  #[test]
  fn html_entities_decoded_then_quotes_stripped() {
    // Entity decoding yields an apostrophe, which the quote-stripping pass
    // removes — same net result as the dashboard's cleanup.
    assert_eq!(
      clean_email(&json!("o&#x27;brien@b.com")).as_deref(),
      Some("obrien@b.com")
    );
  }

  #[test]
  fn garbage_yields_none() {
    assert_eq!(clean_email(&json!("")), None);
    assert_eq!(clean_email(&json!(42)), None);
    assert_eq!(clean_email(&json!("[]")), None);
  }
}
