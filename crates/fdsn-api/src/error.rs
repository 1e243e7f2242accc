//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The upstream data centre failed or answered with an error status.
  #[error("bad gateway: {0}")]
  BadGateway(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self { Self::Store(Box::new(e)) }
}

impl From<JsonRejection> for ApiError {
  fn from(_: JsonRejection) -> Self { Self::BadRequest("invalid JSON".to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::BadGateway(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

/// Parse a numeric path id.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest("invalid id".to_string()))
}
