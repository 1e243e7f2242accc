//! Handlers for `/sources` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/sources` | With network, station and availability counts |
//! | `POST`   | `/sources` | Body: `{"name":..,"base_url":..}` |
//! | `GET`    | `/sources/{id}` | 404 if not found |
//! | `PUT`    | `/sources/{id}` | Same body as `POST` |
//! | `DELETE` | `/sources/{id}` | Cascades to everything imported from it |
//! | `GET`    | `/sources/{id}/explore/stations` | Live upstream station query |
//! | `GET`    | `/sources/{id}/networks` | |
//! | `GET`    | `/sources/{id}/stations` | Paged like `/stations` |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use fdsn_client::{FdsnClient, StationQuery, StationRow};
use fdsn_core::{
  model::{Network, NewSource, Source, SourceSummary, StationPage},
  store::MetadataStore,
};

use crate::{
  ApiState,
  error::{ApiError, parse_id},
  stations::PageParams,
};

/// Fetch a source or fail with 404.
pub(crate) async fn find_source<S>(store: &S, id: i64) -> Result<Source, ApiError>
where
  S: MetadataStore,
{
  store
    .get_source(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("source not found".to_string()))
}

fn validate(body: NewSource) -> Result<NewSource, ApiError> {
  let body = NewSource {
    name: body.name.trim().to_string(),
    base_url: body.base_url.trim().trim_end_matches('/').to_string(),
    ..body
  };
  if body.name.is_empty() || body.base_url.is_empty() {
    return Err(ApiError::BadRequest("name and base_url are required".to_string()));
  }
  Ok(body)
}

// ─── CRUD ─────────────────────────────────────────────────────────────────────

/// `GET /sources`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<SourceSummary>>, ApiError>
where
  S: MetadataStore,
{
  let sources = state.store.list_sources().await.map_err(ApiError::store)?;
  Ok(Json(sources))
}

/// `POST /sources`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<NewSource>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MetadataStore,
{
  let Json(body) = body?;
  let source = state
    .store
    .create_source(validate(body)?)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = source.id, name = %source.name, "source created");
  Ok((StatusCode::CREATED, Json(source)))
}

/// `GET /sources/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Source>, ApiError>
where
  S: MetadataStore,
{
  let id = parse_id(&id)?;
  Ok(Json(find_source(state.store.as_ref(), id).await?))
}

/// `PUT /sources/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  body: Result<Json<NewSource>, JsonRejection>,
) -> Result<Json<Source>, ApiError>
where
  S: MetadataStore,
{
  let id = parse_id(&id)?;
  let Json(body) = body?;
  let source = state
    .store
    .update_source(id, validate(body)?)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("source not found".to_string()))?;
  Ok(Json(source))
}

/// `DELETE /sources/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: MetadataStore,
{
  let id = parse_id(&id)?;
  if !state.store.delete_source(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound("source not found".to_string()));
  }
  tracing::info!(id, "source deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Per-source views ─────────────────────────────────────────────────────────

/// `GET /sources/{id}/explore/stations[?net=..&sta=..&minlat=..]`
///
/// Queries the upstream directly; nothing is stored.
pub async fn explore<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Query(query): Query<StationQuery>,
) -> Result<Json<Vec<StationRow>>, ApiError>
where
  S: MetadataStore,
{
  let id = parse_id(&id)?;
  let source = find_source(state.store.as_ref(), id).await?;
  let client = FdsnClient::with_http_client(state.http.clone(), source.base_url);
  let stations = client
    .query_stations(&query)
    .await
    .map_err(|e| ApiError::BadGateway(e.to_string()))?;
  Ok(Json(stations))
}

/// `GET /sources/{id}/networks`
pub async fn networks<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Network>>, ApiError>
where
  S: MetadataStore,
{
  let id = parse_id(&id)?;
  find_source(state.store.as_ref(), id).await?;
  let networks = state
    .store
    .list_networks(Some(id))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(networks))
}

/// `GET /sources/{id}/stations[?network=..&station=..&limit=..&offset=..]`
pub async fn stations<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<StationPage>, ApiError>
where
  S: MetadataStore,
{
  let id = parse_id(&id)?;
  find_source(state.store.as_ref(), id).await?;
  let page = state
    .store
    .list_stations(params.into_filter(Some(id)))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}
