//! `GET /waveforms/proxy`: stream miniSEED from a chosen source.

use axum::{
  body::Body,
  extract::{Query, State},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use fdsn_client::{DataselectQuery, FdsnClient};
use fdsn_core::store::MetadataStore;
use serde::Deserialize;

use crate::{
  ApiState,
  error::{ApiError, parse_id},
  sources::find_source,
};

pub const MSEED_CONTENT_TYPE: &str = "application/vnd.fdsn.mseed";

#[derive(Debug, Default, Deserialize)]
pub struct ProxyParams {
  pub source_id: Option<String>,
  pub net:       Option<String>,
  pub sta:       Option<String>,
  pub loc:       Option<String>,
  pub cha:       Option<String>,
  pub starttime: Option<String>,
  pub endtime:   Option<String>,
}

fn required(v: Option<String>) -> Option<String> { v.filter(|s| !s.trim().is_empty()) }

/// `GET /waveforms/proxy?source_id=..&net=..&sta=..&loc=..&cha=..&starttime=..&endtime=..`
pub async fn proxy<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ProxyParams>,
) -> Result<Response, ApiError>
where
  S: MetadataStore,
{
  let Some(source_id) = required(params.source_id) else {
    return Err(ApiError::BadRequest("source_id is required".to_string()));
  };
  let source = find_source(state.store.as_ref(), parse_id(&source_id)?).await?;

  let (Some(network), Some(station), Some(channel), Some(starttime), Some(endtime)) = (
    required(params.net),
    required(params.sta),
    required(params.cha),
    required(params.starttime),
    required(params.endtime),
  ) else {
    return Err(ApiError::BadRequest(
      "net, sta, cha, starttime, endtime are required".to_string(),
    ));
  };

  let client = FdsnClient::with_http_client(state.http.clone(), source.base_url);
  let query = DataselectQuery { network, station, location: params.loc, channel, starttime, endtime };
  let upstream = client
    .dataselect(&query)
    .await
    .map_err(|e| ApiError::BadGateway(e.to_string()))?;

  let status = upstream.status();
  if status == StatusCode::NO_CONTENT {
    return Ok(StatusCode::NO_CONTENT.into_response());
  }
  if !status.is_success() {
    let url = upstream.url().to_string();
    let body = upstream.text().await.unwrap_or_default();
    return Err(ApiError::BadGateway(format!("GET {url}: status {}: {body}", status.as_u16())));
  }

  let mut response = Body::from_stream(upstream.bytes_stream()).into_response();
  let headers = response.headers_mut();
  headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(MSEED_CONTENT_TYPE));
  headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("inline"));
  Ok(response)
}
