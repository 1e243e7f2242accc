//! JSON management API for the FDSN mirror.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`MetadataStore`] and [`AvailabilityStore`]. Source CRUD, import
//! triggers, browsing of stored metadata, and a waveform proxy live here;
//! the FDSN protocol itself is served by `fdsn-server`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", fdsn_api::api_router(store.clone(), http.clone()))
//! ```

pub mod error;
pub mod import;
pub mod sources;
pub mod stations;
pub mod stats;
pub mod waveforms;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use fdsn_core::store::{AvailabilityStore, MetadataStore};

pub use error::ApiError;

/// Shared handler state: the store plus the HTTP client used for every
/// upstream call.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub http:  reqwest::Client,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone(), http: self.http.clone() } }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, http: reqwest::Client) -> Router<()>
where
  S: MetadataStore + AvailabilityStore + 'static,
{
  Router::new()
    .route("/health", get(stats::health))
    .route("/stats", get(stats::get::<S>))
    // Sources
    .route("/sources", get(sources::list::<S>).post(sources::create::<S>))
    .route(
      "/sources/{id}",
      get(sources::get_one::<S>)
        .put(sources::update::<S>)
        .delete(sources::delete::<S>),
    )
    .route("/sources/{id}/explore/stations", get(sources::explore::<S>))
    .route("/sources/{id}/networks", get(sources::networks::<S>))
    .route("/sources/{id}/stations", get(sources::stations::<S>))
    // Import
    .route("/import/stations", post(import::stations::<S>))
    .route("/import/targets", get(import::targets::<S>))
    // Stored metadata
    .route("/stations", get(stations::list::<S>))
    .route("/stations/{id}", get(stations::get_one::<S>).delete(stations::delete::<S>))
    .route("/stations/{id}/availability", get(stations::availability::<S>))
    .route("/networks", get(stations::networks::<S>))
    // Waveforms
    .route("/waveforms/proxy", get(waveforms::proxy::<S>))
    .with_state(ApiState { store, http })
}
