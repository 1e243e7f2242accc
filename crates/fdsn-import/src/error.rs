use thiserror::Error;

/// A hard import failure. Availability problems never surface here; they
/// are reported through [`crate::ImportReport`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
  #[error("fetching channels from {source_name}: {source}")]
  Fetch {
    source_name: String,
    #[source]
    source:      fdsn_client::Error,
  },

  #[error("storing channels from {source_name}: {source}")]
  Store {
    source_name: String,
    #[source]
    source:      Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ImportError {
  /// Whether the upstream, rather than the local store, failed.
  pub fn is_upstream(&self) -> bool { matches!(self, Self::Fetch { .. }) }
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;
