//! `fdsnws/dataselect/1/query`: miniSEED passthrough to the data centre that
//! owns the requested network.
//!
//! No stored metadata is consulted beyond the network → source mapping. The
//! upstream status, content type and body are relayed unmodified; the
//! miniSEED type is only supplied when the upstream sends none.

use axum::{
  body::Body,
  extract::{Query, State},
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use fdsn_client::{DataselectQuery, FdsnClient};
use fdsn_core::store::MetadataStore;

use crate::{
  AppState,
  error::{Error, Result},
  handlers::version_response,
  params::{RawParams, first_of},
};

pub const VERSION: &str = "1.1.0";
pub const MSEED_CONTENT_TYPE: &str = "application/vnd.fdsn.mseed";

pub async fn version() -> Response { version_response(VERSION) }

/// `GET|POST /dataselect/1/query?net=..&sta=..&loc=..&cha=..&starttime=..&endtime=..`
pub async fn query<S>(
  State(state): State<AppState<S>>,
  Query(raw): Query<RawParams>,
) -> Result<Response>
where
  S: MetadataStore,
{
  let field = |names: &[&str]| first_of(&raw, names).map(str::to_string);
  let (Some(network), Some(station), Some(channel), Some(starttime), Some(endtime)) = (
    field(&["net", "network"]),
    field(&["sta", "station"]),
    field(&["cha", "channel"]),
    field(&["starttime", "start"]),
    field(&["endtime", "end"]),
  ) else {
    return Err(Error::BadRequest(
      "net, sta, cha, starttime, endtime are required".to_string(),
    ));
  };

  let source = state
    .store
    .network_owner(network.clone())
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound("network source not found".to_string()))?;

  let query = DataselectQuery {
    network,
    station,
    location: field(&["loc", "location"]),
    channel,
    starttime,
    endtime,
  };
  tracing::info!(source = %source.name, network = %query.network, station = %query.station, "dataselect passthrough");

  let upstream = FdsnClient::with_http_client(state.http.clone(), source.base_url)
    .dataselect(&query)
    .await
    .map_err(Error::Upstream)?;

  let status = upstream.status();
  let content_type = upstream
    .headers()
    .get(header::CONTENT_TYPE)
    .cloned()
    .unwrap_or(HeaderValue::from_static(MSEED_CONTENT_TYPE));

  let mut response = Body::from_stream(upstream.bytes_stream()).into_response();
  *response.status_mut() = status;
  response.headers_mut().insert(header::CONTENT_TYPE, content_type);
  Ok(response)
}
