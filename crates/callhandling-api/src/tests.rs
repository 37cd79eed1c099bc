//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use callhandling_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiConfig, api_router};

async fn make_store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn oneshot_raw(
  store: Arc<SqliteStore>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> Response {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  api_router(store, ApiConfig::default()).oneshot(req).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn call_1000() -> Value {
  json!({
    "call": {
      "call_id": 1000,
      "sid": 2000,
      "conversation_id": 3000,
      "ani": "1011011111",
      "dnis": "9099099999",
      "status": "active"
    }
  })
}

fn ringing() -> Value {
  json!({
    "event": {
      "call_id": 2000,
      "identity_id": 9090,
      "timestamp": 20200101,
      "meta": "twilio_meta"
    }
  })
}

// ── Ping ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ping_reports_database_up() {
  let store = make_store().await;
  let resp = oneshot_raw(store, "GET", "/ping?data=hello", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    json_body(resp).await,
    json!({ "data": "Data: hello; Database: up" })
  );
}

#[tokio::test]
async fn ping_without_data() {
  let store = make_store().await;
  let resp = oneshot_raw(store, "GET", "/ping", None).await;
  assert_eq!(json_body(resp).await["data"], "Data: ; Database: up");
}

// ── Calls ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_call() {
  let store = make_store().await;

  let resp = oneshot_raw(store.clone(), "POST", "/calls", Some(call_1000())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = oneshot_raw(store, "GET", "/calls/1000", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, call_1000()["call"]);
}

#[tokio::test]
async fn get_missing_call_returns_404() {
  let store = make_store().await;
  let resp = oneshot_raw(store, "GET", "/calls/1000", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let body = json_body(resp).await;
  assert_eq!(body["kind"], "not_found");
  assert!(body["error"].as_str().unwrap().contains("get call - 1000"));
}

#[tokio::test]
async fn duplicate_call_returns_500() {
  let store = make_store().await;
  oneshot_raw(store.clone(), "POST", "/calls", Some(call_1000())).await;

  let resp = oneshot_raw(store, "POST", "/calls", Some(call_1000())).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(json_body(resp).await["kind"], "no_rows_affected");
}

#[tokio::test]
async fn update_call_uses_path_id() {
  let store = make_store().await;
  oneshot_raw(store.clone(), "POST", "/calls", Some(call_1000())).await;

  let mut body = call_1000();
  body["call"]["call_id"] = json!(1);
  body["call"]["dnis"] = json!("5555555555");
  let resp = oneshot_raw(store.clone(), "PUT", "/calls/1000", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = oneshot_raw(store, "GET", "/calls/1000", None).await;
  let call = json_body(resp).await;
  assert_eq!(call["call_id"], 1000);
  assert_eq!(call["dnis"], "5555555555");
}

#[tokio::test]
async fn update_status_in_transaction() {
  let store = make_store().await;
  oneshot_raw(store.clone(), "POST", "/calls", Some(call_1000())).await;

  let resp = oneshot_raw(
    store.clone(),
    "PUT",
    "/calls/1000/status",
    Some(json!({ "status": "ended" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["status"], "ended");

  let resp = oneshot_raw(store, "GET", "/calls/1000", None).await;
  assert_eq!(json_body(resp).await["status"], "ended");
}

#[tokio::test]
async fn update_status_of_missing_call_returns_404() {
  let store = make_store().await;
  let resp = oneshot_raw(
    store.clone(),
    "PUT",
    "/calls/1000/status",
    Some(json!({ "status": "ended" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  // The failed transaction released the connection.
  let resp = oneshot_raw(store, "GET", "/ping", None).await;
  assert_eq!(json_body(resp).await["data"], "Data: ; Database: up");
}

#[tokio::test]
async fn delete_call_returns_204() {
  let store = make_store().await;
  oneshot_raw(store.clone(), "POST", "/calls", Some(call_1000())).await;

  let resp = oneshot_raw(store.clone(), "DELETE", "/calls/1000", None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = oneshot_raw(store, "GET", "/calls/1000", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Events ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_event_returns_empty_object() {
  let store = make_store().await;
  let resp = oneshot_raw(store.clone(), "POST", "/events/ring", Some(ringing())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert_eq!(json_body(resp).await, json!({}));

  let resp = oneshot_raw(store, "GET", "/calls/2000/events/latest", None).await;
  let event = json_body(resp).await;
  assert_eq!(event["event_type"], "ringing");
  assert_eq!(event["meta"], "twilio_meta");
}

#[tokio::test]
async fn duplicate_event_reports_no_rows_affected() {
  let store = make_store().await;
  oneshot_raw(store.clone(), "POST", "/events/ring", Some(ringing())).await;

  let resp = oneshot_raw(store, "POST", "/events/ring", Some(ringing())).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

  let body = json_body(resp).await;
  assert_eq!(body["kind"], "no_rows_affected");
  assert!(body["error"].as_str().unwrap().contains("twilio_meta"));
}

#[tokio::test]
async fn route_decides_event_type() {
  let store = make_store().await;
  let routes = [
    ("/events/dial", "dialing"),
    ("/events/join", "party joined"),
    ("/events/voicemail", "voicemail created"),
  ];
  for (i, (route, _)) in routes.iter().enumerate() {
    let mut body = ringing();
    body["event"]["timestamp"] = json!(i);
    body["event"]["event_type"] = json!("ignored");
    let resp = oneshot_raw(store.clone(), "POST", route, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "{route}");
  }

  let resp = oneshot_raw(store, "GET", "/calls/2000/events", None).await;
  let history = json_body(resp).await;
  let types: Vec<_> = history
    .as_array()
    .unwrap()
    .iter()
    .map(|e| e["event_type"].as_str().unwrap().to_owned())
    .collect();
  let expected: Vec<_> = routes.iter().map(|(_, t)| t.to_string()).collect();
  assert_eq!(types, expected);
}

#[tokio::test]
async fn latest_event_of_silent_call_returns_404() {
  let store = make_store().await;
  let resp = oneshot_raw(store, "GET", "/calls/42/events/latest", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Callhandlings ────────────────────────────────────────────────────────────

#[tokio::test]
async fn callhandling_lifecycle() {
  let store = make_store().await;

  let resp = oneshot_raw(
    store.clone(),
    "POST",
    "/callhandlings",
    Some(json!({ "name": "after hours" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = json_body(resp).await;
  let id = created["id"].as_str().unwrap().to_owned();
  assert_eq!(created["name"], "after hours");

  let uri = format!("/callhandlings/{id}");
  let resp = oneshot_raw(
    store.clone(),
    "PUT",
    &uri,
    Some(json!({ "name": "overflow" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = oneshot_raw(store.clone(), "GET", &uri, None).await;
  assert_eq!(json_body(resp).await, json!({ "id": id, "name": "overflow" }));

  let resp = oneshot_raw(store.clone(), "DELETE", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = oneshot_raw(store.clone(), "GET", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = oneshot_raw(store, "DELETE", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_callhandling_id_returns_400() {
  let store = make_store().await;
  let resp = oneshot_raw(store, "GET", "/callhandlings/not-a-uuid", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(resp).await["kind"], "malformed_identifier");
}

#[tokio::test]
async fn missing_callhandling_names_the_id() {
  let store = make_store().await;
  let resp = oneshot_raw(
    store,
    "GET",
    "/callhandlings/72bc87f3-4a9f-4d05-93fe-844d3cd94c65",
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body = json_body(resp).await;
  assert!(
    body["error"]
      .as_str()
      .unwrap()
      .contains("72bc87f3-4a9f-4d05-93fe-844d3cd94c65")
  );
}
