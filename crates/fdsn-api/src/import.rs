//! Import triggers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/import/stations` | Body: `{"source_id":1,"network":"IU",..}` |
//! | `GET`  | `/import/targets` | (source, network) pairs already imported |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use fdsn_client::{FdsnClient, StationQuery};
use fdsn_core::{
  model::SourceNetwork,
  store::{AvailabilityStore, MetadataStore},
};
use fdsn_import::{ImportError, ImportReport, Importer};
use serde::Deserialize;

use crate::{ApiState, error::ApiError, sources::find_source};

#[derive(Debug, Default, Deserialize)]
pub struct ImportBody {
  #[serde(default)]
  pub source_id: i64,
  pub network:   Option<String>,
  pub station:   Option<String>,
  pub channel:   Option<String>,
  pub location:  Option<String>,
}

/// `POST /import/stations`
///
/// Soft availability problems are reported inside a 200 response; only a
/// failed channel fetch (502) or store write (500) fails the request.
pub async fn stations<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<ImportBody>, JsonRejection>,
) -> Result<Json<ImportReport>, ApiError>
where
  S: MetadataStore + AvailabilityStore,
{
  let Json(body) = body?;
  if body.source_id == 0 {
    return Err(ApiError::BadRequest("source_id is required".to_string()));
  }
  let source = find_source(state.store.as_ref(), body.source_id).await?;

  let query = StationQuery {
    network: body.network,
    station: body.station,
    channel: body.channel,
    location: body.location,
    ..Default::default()
  };
  let client = FdsnClient::with_http_client(state.http.clone(), source.base_url.clone());
  let store = state.store.as_ref();

  let report = Importer::new(&client, store)
    .with_availability(store)
    .run(&source, &query)
    .await
    .map_err(import_error)?;
  Ok(Json(report))
}

/// A failed channel fetch is the upstream's fault (502); anything else is
/// ours (500). Both keep the message naming the source.
pub(crate) fn import_error(e: ImportError) -> ApiError {
  if e.is_upstream() { ApiError::BadGateway(e.to_string()) } else { ApiError::store(e) }
}

/// `GET /import/targets`
pub async fn targets<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<SourceNetwork>>, ApiError>
where
  S: MetadataStore,
{
  let targets = state
    .store
    .list_source_networks()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(targets))
}
