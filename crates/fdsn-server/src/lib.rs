//! FDSN web-service layer for the metadata mirror.
//!
//! Exposes an axum [`Router`] serving the `fdsnws` station, availability and
//! dataselect services from any store implementing [`MetadataStore`] and
//! [`AvailabilityStore`], and [`app`], which mounts it next to the JSON
//! management API.
//!
//! | Service | Routes | Version |
//! |---------|--------|---------|
//! | station | `/fdsnws/station/1/{version,application.wadl,query}` | 1.1.0 |
//! | dataselect | `/fdsnws/dataselect/1/{version,application.wadl,query}` | 1.1.0 |
//! | availability | `/fdsnws/availability/1/{version,application.wadl,query,extent}` | 1.0.0 |

pub mod error;
pub mod handlers;
pub mod params;
pub mod seed;
pub mod text;
pub mod xml;


pub use error::Error;
pub use seed::seed_sources;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::Request,
  http::HeaderValue,
  routing::get,
};
use fdsn_core::store::{AvailabilityStore, MetadataStore};
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
  trace::TraceLayer,
};
use uuid::Uuid;

use handlers::{availability, dataselect, station, wadl};

// ─── Configuration ────────────────────────────────────────────────────────────

/// A data centre registered at startup if the store does not know it yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceSeed {
  pub name:        String,
  pub base_url:    String,
  #[serde(default)]
  pub description: String,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `FDSN_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub db_path:               PathBuf,
  /// `<Source>` of generated StationXML documents.
  pub xml_source:            String,
  /// `<Sender>` of generated StationXML documents.
  pub xml_sender:            String,
  pub upstream_timeout_secs: u64,
  pub sources:               Vec<SourceSeed>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  8080,
      db_path:               PathBuf::from("./fdsn.db"),
      xml_source:            "fdsn-mirror".to_string(),
      xml_sender:            "fdsn-mirror".to_string(),
      upstream_timeout_secs: 60,
      sources:               vec![
        SourceSeed {
          name:        "IRIS".to_string(),
          base_url:    "https://service.iris.edu".to_string(),
          description: "IRIS Data Management Center".to_string(),
        },
        SourceSeed {
          name:        "ORFEUS".to_string(),
          base_url:    "https://www.orfeus-eu.org".to_string(),
          description: "ORFEUS Data Center (Europe)".to_string(),
        },
      ],
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  /// Client for every upstream call: dataselect passthrough, live
  /// exploration and imports.
  pub http:   reqwest::Client,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), config: self.config.clone(), http: self.http.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the `fdsnws` router. Every `query` endpoint accepts POST with the
/// same query-string parameters as GET.
pub fn fdsn_router<S>(state: AppState<S>) -> Router
where
  S: MetadataStore + AvailabilityStore + 'static,
{
  Router::new()
    // Station
    .route("/station/1/version",               get(station::version))
    .route("/station/1/application.wadl",      get(wadl::station))
    .route("/station/1/query",                 get(station::query::<S>).post(station::query::<S>))
    // Dataselect
    .route("/dataselect/1/version",            get(dataselect::version))
    .route("/dataselect/1/application.wadl",   get(wadl::dataselect))
    .route("/dataselect/1/query",              get(dataselect::query::<S>).post(dataselect::query::<S>))
    // Availability
    .route("/availability/1/version",          get(availability::version))
    .route("/availability/1/application.wadl", get(wadl::availability))
    .route("/availability/1/query",            get(availability::query::<S>).post(availability::query::<S>))
    .route("/availability/1/extent",           get(availability::extent::<S>).post(availability::extent::<S>))
    .with_state(state)
}

/// Tags each request with a random UUID in `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
  fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
    HeaderValue::from_str(&Uuid::new_v4().to_string())
      .ok()
      .map(RequestId::new)
  }
}

/// The complete application: `fdsnws` under `/fdsnws`, the management API
/// under `/api/v1`, with CORS, request ids and request tracing.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: MetadataStore + AvailabilityStore + 'static,
{
  let api = fdsn_api::api_router(state.store.clone(), state.http.clone());
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  Router::new()
    .nest("/fdsnws", fdsn_router(state))
    .nest("/api/v1", api)
    .layer(cors)
    .layer(PropagateRequestIdLayer::x_request_id())
    .layer(TraceLayer::new_for_http())
    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}
