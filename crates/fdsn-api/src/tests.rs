//! Router-level tests against an in-memory store and a stub upstream.

use std::{collections::HashMap, sync::Arc};

use axum::{
  Router,
  body::{Body, Bytes},
  extract::Query,
  http::{HeaderMap, Request, StatusCode, header},
  routing::get,
};
use fdsn_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

// ─── Stub upstream ───────────────────────────────────────────────────────────

async fn station_service(Query(q): Query<HashMap<String, String>>) -> (StatusCode, String) {
  let level = q.get("level").map(String::as_str).unwrap_or("station");
  match (level, q.get("net").map(String::as_str)) {
    (_, Some("FAIL")) => (StatusCode::INTERNAL_SERVER_ERROR, "upstream down".to_string()),
    ("channel", _) => (
      StatusCode::OK,
      "IU|ANMO|00|BHZ|34.9459|-106.4572|1671.0|145.0|0.0|-90.0|STS-6A|3.3128E9|0.02|M/S|20.0|2018-07-09T20:45:00|\n\
       IU|ANMO|00|BH1|34.9459|-106.4572|1671.0|145.0|0.0|0.0|STS-6A|3.3128E9|0.02|M/S|20.0|2018-07-09T20:45:00|\n"
        .to_string(),
    ),
    ("station", _) => (
      StatusCode::OK,
      "#Network|Station|Latitude|Longitude|Elevation|SiteName|StartTime|EndTime\n\
       IU|ANMO|34.945900|-106.457200|1850.0|Albuquerque, New Mexico, USA|1989-08-29T00:00:00|\n"
        .to_string(),
    ),
    _ => (StatusCode::NO_CONTENT, String::new()),
  }
}

async fn extent_service() -> (StatusCode, String) {
  (
    StatusCode::OK,
    "IU|ANMO|00|BHZ|M|20.0|2020-01-01T00:00:00|2024-06-15T12:30:00\n".to_string(),
  )
}

async fn dataselect_service(Query(q): Query<HashMap<String, String>>) -> (StatusCode, Vec<u8>) {
  match q.get("sta").map(String::as_str) {
    Some("QUIET") => (StatusCode::NO_CONTENT, Vec::new()),
    Some("BROKEN") => (StatusCode::INTERNAL_SERVER_ERROR, b"nope".to_vec()),
    _ => (StatusCode::OK, vec![b'0', b'0', b'0', b'0', b'0', b'1', b'D', b' ']),
  }
}

async fn upstream() -> String {
  let router = Router::new()
    .route("/fdsnws/station/1/query", get(station_service))
    .route("/fdsnws/availability/1/extent", get(extent_service))
    .route("/fdsnws/dataselect/1/query", get(dataselect_service));
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
  format!("http://{addr}")
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn app() -> Router {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  api_router(store, reqwest::Client::new())
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<&str>,
) -> (StatusCode, HeaderMap, Bytes) {
  let mut req = Request::builder().method(method).uri(uri);
  if body.is_some() {
    req = req.header(header::CONTENT_TYPE, "application/json");
  }
  let req = req
    .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
    .unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, headers, bytes)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let body = body.map(|b| b.to_string());
  let (status, _, bytes) = send(app, method, uri, body.as_deref()).await;
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

async fn create_source(app: &Router, name: &str, base_url: &str) -> i64 {
  let (status, body) = send_json(
    app,
    "POST",
    "/sources",
    Some(json!({ "name": name, "base_url": base_url, "description": "test" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["id"].as_i64().unwrap()
}

// ─── Sources ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
  let app = app().await;
  let (status, body) = send_json(&app, "GET", "/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn source_lifecycle() {
  let app = app().await;
  let id = create_source(&app, "IRIS", "https://service.iris.edu/").await;

  let (status, body) = send_json(&app, "GET", &format!("/sources/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["base_url"], "https://service.iris.edu");
  assert_eq!(body["enabled"], true);

  let (status, body) = send_json(
    &app,
    "PUT",
    &format!("/sources/{id}"),
    Some(json!({ "name": "IRIS DMC", "base_url": "https://service.iris.edu", "enabled": false })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "IRIS DMC");
  assert_eq!(body["enabled"], false);

  let (status, body) = send_json(&app, "GET", "/sources", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["network_count"], 0);

  let (status, _) = send_json(&app, "DELETE", &format!("/sources/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, body) = send_json(&app, "GET", &format!("/sources/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "source not found");
}

#[tokio::test]
async fn malformed_source_requests_are_rejected() {
  let app = app().await;

  let (status, _, bytes) = send(&app, "POST", "/sources", Some("{not json")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(body["error"], "invalid JSON");

  let (status, body) =
    send_json(&app, "POST", "/sources", Some(json!({ "name": "  ", "base_url": "x" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "name and base_url are required");

  let (status, body) = send_json(&app, "GET", "/sources/abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "invalid id");
}

// ─── Import and browse ───────────────────────────────────────────────────────

#[tokio::test]
async fn import_requires_a_known_source() {
  let app = app().await;

  let (status, body) = send_json(&app, "POST", "/import/stations", Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "source_id is required");

  let (status, body) =
    send_json(&app, "POST", "/import/stations", Some(json!({ "source_id": 42 }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "source not found");
}

#[tokio::test]
async fn import_then_browse() {
  let base = upstream().await;
  let app = app().await;
  let id = create_source(&app, "IRIS", &base).await;

  let (status, report) = send_json(
    &app,
    "POST",
    "/import/stations",
    Some(json!({ "source_id": id, "network": "IU", "station": "ANMO" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    report,
    json!({ "imported": 2, "availability_count": 1, "availability_status": "ok" })
  );

  let (_, page) = send_json(&app, "GET", "/stations?network=IU&limit=5000", None).await;
  assert_eq!(page["total"], 1);
  let station = &page["stations"][0];
  assert_eq!(station["site_name"], "Albuquerque, New Mexico, USA");
  assert_eq!(station["source_name"], "IRIS");
  assert_eq!(station["has_availability"], true);
  let station_id = station["id"].as_i64().unwrap();

  let (status, detail) = send_json(&app, "GET", &format!("/stations/{station_id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(detail["channels"].as_array().unwrap().len(), 2);
  assert_eq!(detail["availability"].as_array().unwrap().len(), 1);
  assert_eq!(detail["availability"][0]["channel_code"], "BHZ");

  let (_, rows) =
    send_json(&app, "GET", &format!("/stations/{station_id}/availability"), None).await;
  assert_eq!(rows.as_array().unwrap().len(), 2);

  let (_, targets) = send_json(&app, "GET", "/import/targets", None).await;
  assert_eq!(targets, json!([{ "source_id": id, "source_name": "IRIS", "network_code": "IU" }]));

  let (_, networks) = send_json(&app, "GET", &format!("/sources/{id}/networks"), None).await;
  assert_eq!(networks[0]["code"], "IU");
  let (_, page) = send_json(&app, "GET", &format!("/sources/{id}/stations"), None).await;
  assert_eq!(page["total"], 1);

  let (_, stats) = send_json(&app, "GET", "/stats", None).await;
  assert_eq!(stats, json!({ "sources": 1, "networks": 1, "stations": 1, "channels": 2 }));

  let (status, _) = send_json(&app, "DELETE", &format!("/stations/{station_id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, body) = send_json(&app, "GET", &format!("/stations/{station_id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "station not found");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
  let base = upstream().await;
  let app = app().await;
  let id = create_source(&app, "IRIS", &base).await;

  let (status, body) = send_json(
    &app,
    "POST",
    "/import/stations",
    Some(json!({ "source_id": id, "network": "FAIL" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert!(body["error"].as_str().unwrap().contains("status 500: upstream down"));

  let (status, _) =
    send_json(&app, "GET", &format!("/sources/{id}/explore/stations?net=FAIL"), None).await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn explore_returns_upstream_rows() {
  let base = upstream().await;
  let app = app().await;
  let id = create_source(&app, "IRIS", &base).await;

  let (status, rows) =
    send_json(&app, "GET", &format!("/sources/{id}/explore/stations?net=IU&minlat=30"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(rows[0]["station"], "ANMO");
  assert_eq!(rows[0]["latitude"], 34.9459);

  // Exploring stores nothing.
  let (_, stats) = send_json(&app, "GET", "/stats", None).await;
  assert_eq!(stats["stations"], 0);
}

// ─── Waveforms ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn waveform_proxy_validates_parameters() {
  let app = app().await;

  let (status, body) = send_json(&app, "GET", "/waveforms/proxy?net=IU", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "source_id is required");

  let id = create_source(&app, "IRIS", "http://127.0.0.1:9").await;
  let (status, body) =
    send_json(&app, "GET", &format!("/waveforms/proxy?source_id={id}&net=IU&sta=ANMO"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "net, sta, cha, starttime, endtime are required");
}

#[tokio::test]
async fn waveform_proxy_streams_upstream_bytes() {
  let base = upstream().await;
  let app = app().await;
  let id = create_source(&app, "IRIS", &base).await;
  let uri = |sta: &str| {
    format!(
      "/waveforms/proxy?source_id={id}&net=IU&sta={sta}&cha=BHZ\
       &starttime=2024-01-01T00:00:00&endtime=2024-01-01T00:01:00"
    )
  };

  let (status, headers, bytes) = send(&app, "GET", &uri("ANMO"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(headers[header::CONTENT_TYPE], "application/vnd.fdsn.mseed");
  assert_eq!(headers[header::CONTENT_DISPOSITION], "inline");
  assert_eq!(&bytes[..], b"000001D ");

  let (status, _, bytes) = send(&app, "GET", &uri("QUIET"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert!(bytes.is_empty());

  let (status, _, _) = send(&app, "GET", &uri("BROKEN"), None).await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn store_failure_during_import_names_the_source() {
  let err = crate::import::import_error(fdsn_import::ImportError::Store {
    source_name: "IRIS".to_string(),
    source:      "disk I/O error".into(),
  });
  assert!(matches!(err, crate::error::ApiError::Store(_)));

  let resp = axum::response::IntoResponse::into_response(err);
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json: Value = serde_json::from_slice(&body).unwrap();
  assert_eq!(json["error"], "storing channels from IRIS: disk I/O error");
}
