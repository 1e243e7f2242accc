//! Error types and axum `IntoResponse` implementation.
//!
//! FDSN clients expect plain-text error bodies, so every variant renders as
//! `text/plain` with the message alone.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  BadRequest(String),
  #[error("{0}")]
  NotFound(String),
  /// The owning data centre could not be reached.
  #[error("upstream error: {0}")]
  Upstream(#[source] fdsn_client::Error),
  #[error("xml error: {0}")]
  Xml(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self { Self::Store(Box::new(e)) }
}

impl From<fdsn_core::Error> for Error {
  fn from(e: fdsn_core::Error) -> Self { Self::BadRequest(e.to_string()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Upstream(_) => StatusCode::BAD_GATEWAY,
      Error::Xml(_) | Error::Store(_) => {
        tracing::error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, self.to_string()).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
