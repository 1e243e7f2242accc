use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("GET {url}: {source}")]
  Transport {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  /// The upstream does not offer this service (404 or 501).
  #[error("GET {url}: status {status}: {body}")]
  NotSupported {
    url:    String,
    status: u16,
    body:   String,
  },

  #[error("GET {url}: status {status}: {body}")]
  Status {
    url:    String,
    status: u16,
    body:   String,
  },
}

impl Error {
  /// Classify a non-success upstream answer.
  pub(crate) fn from_status(url: String, status: StatusCode, body: String) -> Self {
    let code = status.as_u16();
    if matches!(status, StatusCode::NOT_FOUND | StatusCode::NOT_IMPLEMENTED) {
      Self::NotSupported { url, status: code, body }
    } else {
      Self::Status { url, status: code, body }
    }
  }

  pub fn is_not_supported(&self) -> bool { matches!(self, Self::NotSupported { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
