//! Integration tests for the engine against a mocked backend.

use provost_core::{
  appointee::{Identity, LifecycleStatus},
  lifecycle::{Action, TransitionPayload},
};
use serde_json::json;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{header, method, path},
};

use crate::{ExecutionError, LifecycleEngine, SourceConfig};

async fn engine(server: &MockServer) -> LifecycleEngine {
  LifecycleEngine::new(SourceConfig::new(server.uri(), "test-token"))
    .expect("engine")
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
  Mock::given(method("GET"))
    .and(path(route))
    .respond_with(ResponseTemplate::new(200).set_body_json(body))
    .mount(server)
    .await;
}

// ─── Fetch & reconcile ───────────────────────────────────────────────────────

#[tokio::test]
async fn view_decodes_bare_arrays_and_envelopes() {
  let server = MockServer::start().await;
  // Requests answer with a bare array, records with the envelope shape.
  mount_get(
    &server,
    "/hod-requests",
    json!([
      { "id": 1, "name": "Asha Verma", "email": "asha@example.edu",
        "status": "pending" },
      { "id": 2, "name": "Vikram Rao", "email": "vikram@example.edu",
        "status": "approved" },
    ]),
  )
  .await;
  mount_get(
    &server,
    "/hod-records",
    json!({
      "success": true,
      "count": 1,
      "data": [
        { "id": 2, "name": "Vikram Rao",
          "department": { "id": 4, "name": "Physics" } },
      ],
    }),
  )
  .await;
  mount_get(&server, "/retired-hods", json!([])).await;

  let view = engine(&server).await.lifecycle_view().await;
  assert_eq!(view.appointees.len(), 2);
  assert!(view.degraded.is_empty());

  assert_eq!(
    view.appointees[&Identity::Id(1)].status,
    LifecycleStatus::Pending
  );
  let vikram = &view.appointees[&Identity::Id(2)];
  assert_eq!(vikram.status, LifecycleStatus::Active);
  assert_eq!(vikram.department_name.as_deref(), Some("Physics"));
  // Gap-filled from the request row.
  assert_eq!(vikram.email, "vikram@example.edu");
}

#[tokio::test]
async fn missing_records_endpoint_reconstructs_actives_from_requests() {
  let server = MockServer::start().await;
  mount_get(
    &server,
    "/hod-requests",
    json!([
      { "id": 1, "name": "Pending P", "status": "pending" },
      { "id": 2, "name": "Approved A", "status": "approved" },
    ]),
  )
  .await;
  Mock::given(method("GET"))
    .and(path("/hod-records"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;
  mount_get(&server, "/retired-hods", json!([])).await;

  let view = engine(&server).await.lifecycle_view().await;
  // The legacy candidate filters requests to approved ones and the
  // actives stage forces them Active.
  assert_eq!(
    view.appointees[&Identity::Id(2)].status,
    LifecycleStatus::Active
  );
  assert_eq!(
    view.appointees[&Identity::Id(1)].status,
    LifecycleStatus::Pending
  );

  let actives = view
    .degraded
    .iter()
    .find(|d| d.source == provost_wire::SourceKind::Actives)
    .expect("actives degradation recorded");
  assert_eq!(actives.causes.len(), 1);
  assert!(actives.causes[0].contains("404") || actives.causes[0].contains("not found"));
}

#[tokio::test]
async fn empty_records_endpoint_keeps_approved_requests_approved() {
  let server = MockServer::start().await;
  mount_get(
    &server,
    "/hod-requests",
    json!([{ "id": 1, "name": "Asha Verma", "status": "approved" }]),
  )
  .await;
  // The records endpoint answers and the list is genuinely empty:
  // nobody is serving, so approval must not be promoted to Active.
  mount_get(&server, "/hod-records", json!([])).await;
  mount_get(&server, "/retired-hods", json!([])).await;

  let view = engine(&server).await.lifecycle_view().await;
  assert_eq!(
    view.appointees[&Identity::Id(1)].status,
    LifecycleStatus::Approved
  );
  assert!(view.degraded.is_empty());
}

#[tokio::test]
async fn all_sources_down_yields_empty_view_not_error() {
  let server = MockServer::start().await;
  for route in ["/hod-requests", "/hod-records", "/retired-hods"] {
    Mock::given(method("GET"))
      .and(path(route))
      .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
      .mount(&server)
      .await;
  }

  let view = engine(&server).await.lifecycle_view().await;
  assert!(view.appointees.is_empty());
  assert_eq!(view.degraded.len(), 3);
}

#[tokio::test]
async fn bad_rows_degrade_without_poisoning_the_batch() {
  let server = MockServer::start().await;
  mount_get(
    &server,
    "/hod-requests",
    json!([
      { "id": 1, "name": "Good Row" },
      { "name": "No Identity At All" },
    ]),
  )
  .await;
  mount_get(&server, "/hod-records", json!([])).await;
  mount_get(&server, "/retired-hods", json!([])).await;

  let view = engine(&server).await.lifecycle_view().await;
  assert_eq!(view.appointees.len(), 1);
  let requests = view
    .degraded
    .iter()
    .find(|d| d.source == provost_wire::SourceKind::Requests)
    .expect("requests degradation recorded");
  assert_eq!(requests.skipped_rows, 1);
}

#[tokio::test]
async fn token_is_sent_on_every_fetch() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/hod-requests"))
    .and(header("Authorization", "Token test-token"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .expect(1)
    .mount(&server)
    .await;
  mount_get(&server, "/hod-records", json!([])).await;
  mount_get(&server, "/retired-hods", json!([])).await;

  engine(&server).await.lifecycle_view().await;
}

// ─── Transitions ─────────────────────────────────────────────────────────────

async fn seeded_engine(
  server: &MockServer,
  status: &str,
) -> LifecycleEngine {
  mount_get(
    server,
    "/hod-requests",
    json!([{ "id": 1, "name": "Asha Verma", "status": status,
             "department": { "name": "Physics" } }]),
  )
  .await;
  mount_get(server, "/hod-records", json!([])).await;
  mount_get(server, "/retired-hods", json!([])).await;

  let e = engine(server).await;
  e.lifecycle_view().await;
  e
}

#[tokio::test]
async fn approve_posts_the_action_endpoint() {
  let server = MockServer::start().await;
  let e = seeded_engine(&server, "pending").await;

  Mock::given(method("POST"))
    .and(path("/hod-requests/1/action"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
    )
    .expect(1)
    .mount(&server)
    .await;

  let updated = e
    .request_transition(
      &Identity::Id(1),
      Action::Approve,
      &TransitionPayload::default(),
    )
    .await
    .unwrap();
  assert_eq!(updated.status, LifecycleStatus::Approved);
  // The engine's own view reflects the applied transition.
  assert_eq!(e.search("Asha")[0].status, LifecycleStatus::Approved);
}

#[tokio::test]
async fn permission_failure_stops_the_candidate_walk() {
  let server = MockServer::start().await;
  let e = seeded_engine(&server, "pending").await;

  Mock::given(method("POST"))
    .and(path("/hod-requests/1/action"))
    .respond_with(ResponseTemplate::new(403))
    .mount(&server)
    .await;

  let err = e
    .request_transition(
      &Identity::Id(1),
      Action::Approve,
      &TransitionPayload::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ExecutionError::PermissionDenied { .. }));
}

#[tokio::test]
async fn expired_token_is_permission_denied_not_exhaustion() {
  let server = MockServer::start().await;
  let e = seeded_engine(&server, "pending").await;

  Mock::given(method("POST"))
    .and(path("/hod-requests/1/action"))
    .respond_with(ResponseTemplate::new(401))
    .mount(&server)
    .await;

  let err = e
    .request_transition(
      &Identity::Id(1),
      Action::Approve,
      &TransitionPayload::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ExecutionError::PermissionDenied { .. }));
}

#[tokio::test]
async fn retire_falls_back_to_the_archive_endpoint() {
  let server = MockServer::start().await;
  // An active record, reconciled in via the records source.
  mount_get(&server, "/hod-requests", json!([])).await;
  mount_get(
    &server,
    "/hod-records",
    json!([{ "id": 1, "name": "Meera Iyer" }]),
  )
  .await;
  mount_get(&server, "/retired-hods", json!([])).await;
  let e = engine(&server).await;
  e.lifecycle_view().await;

  Mock::given(method("PUT"))
    .and(path("/hod-records/1"))
    .respond_with(ResponseTemplate::new(500))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/retired-hods"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
    )
    .expect(1)
    .mount(&server)
    .await;

  let updated = e
    .request_transition(
      &Identity::Id(1),
      Action::Retire,
      &TransitionPayload {
        reason: Some("Superannuation".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.status, LifecycleStatus::Retired);
  assert_eq!(updated.retirement_reason.as_deref(), Some("Superannuation"));
}

#[tokio::test]
async fn exhausted_candidates_report_every_cause() {
  let server = MockServer::start().await;
  mount_get(&server, "/hod-requests", json!([])).await;
  mount_get(
    &server,
    "/hod-records",
    json!([{ "id": 1, "name": "Meera Iyer" }]),
  )
  .await;
  mount_get(&server, "/retired-hods", json!([])).await;
  let e = engine(&server).await;
  e.lifecycle_view().await;

  Mock::given(method("PUT"))
    .and(path("/hod-records/1"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/retired-hods"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;

  let err = e
    .request_transition(
      &Identity::Id(1),
      Action::Retire,
      &TransitionPayload::default(),
    )
    .await
    .unwrap_err();
  match err {
    ExecutionError::AllCandidatesFailed { action, causes } => {
      assert_eq!(action, Action::Retire);
      assert_eq!(causes.len(), 2);
    }
    other => panic!("expected AllCandidatesFailed, got {other:?}"),
  }
}

#[tokio::test]
async fn invalid_transition_is_rejected_before_any_request() {
  let server = MockServer::start().await;
  let e = seeded_engine(&server, "pending").await;
  // No POST mock mounted: a network call would 404 loudly, but
  // validation fails first.
  let err = e
    .request_transition(
      &Identity::Id(1),
      Action::Retire,
      &TransitionPayload::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ExecutionError::ValidationRejected(_)));
}

#[tokio::test]
async fn unknown_identity_is_an_error() {
  let server = MockServer::start().await;
  let e = seeded_engine(&server, "pending").await;
  let err = e
    .request_transition(
      &Identity::Id(99),
      Action::Approve,
      &TransitionPayload::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ExecutionError::UnknownAppointee(_)));
}

#[tokio::test]
async fn email_keyed_record_cannot_be_addressed_remotely() {
  let server = MockServer::start().await;
  mount_get(
    &server,
    "/hod-requests",
    json!([{ "name": "No Id", "email": "noid@example.edu",
             "status": "pending" }]),
  )
  .await;
  mount_get(&server, "/hod-records", json!([])).await;
  mount_get(&server, "/retired-hods", json!([])).await;
  let e = engine(&server).await;
  e.lifecycle_view().await;

  let err = e
    .request_transition(
      &Identity::from_email("noid@example.edu"),
      Action::Approve,
      &TransitionPayload::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ExecutionError::UnknownAppointee(_)));
}

// ─── Read helpers ────────────────────────────────────────────────────────────

#[tokio::test]
async fn tenure_text_uses_recorded_retirement_date() {
  let server = MockServer::start().await;
  mount_get(&server, "/hod-requests", json!([])).await;
  mount_get(
    &server,
    "/hod-records",
    json!([{ "id": 1, "name": "Meera Iyer", "hire_date": "2020-01-15" }]),
  )
  .await;
  mount_get(
    &server,
    "/retired-hods",
    json!([{ "id": 1, "name": "Meera Iyer",
             "retired_at": "2023-01-15T09:00:00Z" }]),
  )
  .await;
  let e = engine(&server).await;
  e.lifecycle_view().await;

  // `today` is irrelevant once a retirement date is recorded.
  let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
  assert_eq!(
    e.tenure_text(&Identity::Id(1), today).as_deref(),
    Some("3 years, 0 months")
  );
  assert_eq!(e.tenure_text(&Identity::Id(42), today), None);
}

#[tokio::test]
async fn stats_reflect_the_reconciled_view() {
  let server = MockServer::start().await;
  mount_get(
    &server,
    "/hod-requests",
    json!([{ "id": 1, "name": "P", "status": "pending" }]),
  )
  .await;
  mount_get(
    &server,
    "/hod-records",
    json!([{ "id": 2, "name": "A", "department_name": "Physics" }]),
  )
  .await;
  mount_get(
    &server,
    "/retired-hods",
    json!([{ "id": 3, "name": "R" }]),
  )
  .await;
  let e = engine(&server).await;
  e.lifecycle_view().await;

  let s = e.stats();
  assert_eq!(s.active, 1);
  assert_eq!(s.pending_requests, 1);
  assert_eq!(s.retired, 1);
  assert_eq!(s.department_wise.get("Physics"), Some(&1));
}
