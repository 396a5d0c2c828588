//! Remote execution of lifecycle transitions.
//!
//! Every action validates against the state machine before any request
//! goes out, then walks an ordered list of candidate endpoints (primary
//! first, legacy fallbacks after). The backends answer heterogeneously,
//! so success is "any 2xx"; 404s and server errors move to the next
//! candidate, permission failures stop the walk.

use provost_core::{
  appointee::{Appointee, LifecycleStatus},
  lifecycle::{Action, TransitionPayload, transition},
};
use reqwest::Method;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
  error::{ExecutionError, FetchError},
  source::SourceClient,
};

struct Endpoint {
  label:  String,
  method: Method,
  path:   String,
  body:   Option<Value>,
}

pub struct TransitionExecutor {
  client: SourceClient,
}

impl TransitionExecutor {
  pub fn new(client: SourceClient) -> Self {
    Self { client }
  }

  /// Validate and perform `action` on `appointee`. Returns the record
  /// as it stands after a successful remote write.
  pub async fn execute(
    &self,
    appointee: &Appointee,
    action: Action,
    payload: &TransitionPayload,
  ) -> Result<Appointee, ExecutionError> {
    let next = transition(appointee.status, action, payload)?;

    // Write endpoints address records by numeric id only; an
    // email-keyed record cannot be targeted remotely.
    let id = appointee
      .identity
      .numeric()
      .ok_or_else(|| {
        ExecutionError::UnknownAppointee(appointee.identity.clone())
      })?;

    let mut causes = Vec::new();
    for endpoint in candidates(id, action, payload) {
      match self
        .client
        .request(endpoint.method.clone(), &endpoint.path, endpoint.body.as_ref())
        .await
      {
        Ok(_) => {
          info!(%action, endpoint = %endpoint.label, "transition applied");
          return Ok(applied(appointee, action, payload, next));
        }
        Err(FetchError::Unauthorized) | Err(FetchError::Forbidden) => {
          return Err(ExecutionError::PermissionDenied {
            endpoint: endpoint.label,
          });
        }
        Err(error) => {
          warn!(
            %action,
            endpoint = %endpoint.label,
            %error,
            "transition candidate failed"
          );
          causes.push(format!("{}: {}", endpoint.label, error));
        }
      }
    }
    Err(ExecutionError::AllCandidatesFailed { action, causes })
  }
}

/// The record as the caller should see it after the remote accepted
/// the write. Timestamps the server assigns (like the archive's
/// `retired_at`) arrive with the next reconciliation pass.
fn applied(
  appointee: &Appointee,
  action: Action,
  payload: &TransitionPayload,
  next: LifecycleStatus,
) -> Appointee {
  let mut a = appointee.clone();
  a.status = next;
  match action {
    Action::Reject => {
      a.rejection_reason = payload.reason.clone().or(a.rejection_reason);
    }
    Action::Deactivate | Action::Retire => {
      a.retirement_reason = payload.reason.clone().or(a.retirement_reason);
    }
    Action::Activate => {
      a.department_name = a.department_name.or_else(|| payload.department.clone());
      a.hire_date = a.hire_date.or(payload.hire_date);
    }
    Action::Approve => {}
  }
  a
}

/// Ordered endpoint candidates per action. Primary endpoints first,
/// then the legacy routes older backend deployments still answer.
fn candidates(
  id: i64,
  action: Action,
  payload: &TransitionPayload,
) -> Vec<Endpoint> {
  let reason = payload.reason.clone();
  match action {
    Action::Approve => vec![Endpoint {
      label:  format!("POST /hod-requests/{id}/action"),
      method: Method::POST,
      path:   format!("/hod-requests/{id}/action"),
      body:   Some(json!({ "action": "approve" })),
    }],
    Action::Reject => vec![Endpoint {
      label:  format!("POST /hod-requests/{id}/action"),
      method: Method::POST,
      path:   format!("/hod-requests/{id}/action"),
      body:   Some(json!({ "action": "reject", "reason": reason })),
    }],
    // The backend materialises every approved request in one shot.
    Action::Activate => vec![Endpoint {
      label:  "POST /create-hod-from-request".to_string(),
      method: Method::POST,
      path:   "/create-hod-from-request".to_string(),
      body:   Some(json!({})),
    }],
    Action::Deactivate => vec![
      Endpoint {
        label:  format!("DELETE /hod-records/{id}"),
        method: Method::DELETE,
        path:   format!("/hod-records/{id}"),
        body:   None,
      },
      // Some deployments reject DELETE but accept a raw status write.
      Endpoint {
        label:  format!("PUT /hod-records/{id}"),
        method: Method::PUT,
        path:   format!("/hod-records/{id}"),
        body:   Some(json!({
          "action": "deactivate",
          "is_active": false,
          "reason": reason.clone(),
        })),
      },
      Endpoint {
        label:  format!("POST /hod-requests/{id}/action"),
        method: Method::POST,
        path:   format!("/hod-requests/{id}/action"),
        body:   Some(json!({ "action": "deactivate", "reason": reason })),
      },
    ],
    Action::Retire => vec![
      Endpoint {
        label:  format!("PUT /hod-records/{id}"),
        method: Method::PUT,
        path:   format!("/hod-records/{id}"),
        body:   Some(json!({ "action": "retire", "reason": reason.clone() })),
      },
      Endpoint {
        label:  "POST /retired-hods".to_string(),
        method: Method::POST,
        path:   "/retired-hods".to_string(),
        body:   Some(json!({ "hod_id": id, "reason": reason })),
      },
    ],
  }
}
