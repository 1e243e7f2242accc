//! Handlers for stored stations and networks.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/stations` | `?network&station&limit&offset` |
//! | `GET`    | `/stations/{id}` | With channels and availability |
//! | `DELETE` | `/stations/{id}` | |
//! | `GET`    | `/stations/{id}/availability` | |
//! | `GET`    | `/networks` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use fdsn_core::{
  model::{ChannelAvailability, Network, StationDetail, StationFilter, StationPage},
  store::{AvailabilityStore, MetadataStore},
};
use serde::Deserialize;

use crate::{
  ApiState,
  error::{ApiError, parse_id},
};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub network: Option<String>,
  pub station: Option<String>,
  pub limit:   Option<i64>,
  pub offset:  Option<i64>,
}

impl PageParams {
  /// Out-of-range limits fall back to the default page size.
  pub fn into_filter(self, source_id: Option<i64>) -> StationFilter {
    let limit = match self.limit {
      Some(n) if n > 0 && n <= MAX_LIMIT => n,
      _ => DEFAULT_LIMIT,
    };
    StationFilter {
      network: self.network.filter(|s| !s.is_empty()),
      station: self.station.filter(|s| !s.is_empty()),
      source_id,
      limit,
      offset: self.offset.unwrap_or(0).max(0),
    }
  }
}

/// `GET /stations`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<PageParams>,
) -> Result<Json<StationPage>, ApiError>
where
  S: MetadataStore,
{
  let page = state
    .store
    .list_stations(params.into_filter(None))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

/// `GET /stations/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<StationDetail>, ApiError>
where
  S: MetadataStore + AvailabilityStore,
{
  let id = parse_id(&id)?;
  let mut detail = state
    .store
    .get_station(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("station not found".to_string()))?;
  detail.availability = state
    .store
    .station_availability(id)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .filter(|a| a.earliest.is_some())
    .collect();
  Ok(Json(detail))
}

/// `DELETE /stations/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: MetadataStore,
{
  let id = parse_id(&id)?;
  if !state.store.delete_station(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound("station not found".to_string()));
  }
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /stations/{id}/availability`
///
/// Every channel of the station, with or without recorded extents.
pub async fn availability<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<ChannelAvailability>>, ApiError>
where
  S: AvailabilityStore,
{
  let id = parse_id(&id)?;
  let rows = state
    .store
    .station_availability(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

/// `GET /networks`
pub async fn networks<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Network>>, ApiError>
where
  S: MetadataStore,
{
  let networks = state.store.list_networks(None).await.map_err(ApiError::store)?;
  Ok(Json(networks))
}
