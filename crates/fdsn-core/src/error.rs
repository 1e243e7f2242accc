//! Error types for `fdsn-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid time: {0:?}")]
  InvalidTime(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
