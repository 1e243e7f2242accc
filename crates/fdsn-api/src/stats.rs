//! `/health` and `/stats`.

use axum::{Json, extract::State};
use fdsn_core::{model::Stats, store::MetadataStore};
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError};

/// `GET /health`
pub async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// `GET /stats`
pub async fn get<S>(State(state): State<ApiState<S>>) -> Result<Json<Stats>, ApiError>
where
  S: MetadataStore,
{
  let stats = state.store.stats().await.map_err(ApiError::store)?;
  Ok(Json(stats))
}
