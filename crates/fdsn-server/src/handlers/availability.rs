//! `fdsnws/availability/1/{query,extent}`: stored extents as FDSN text.
//!
//! `query` lists every stored extent; `extent` collapses them to one row per
//! channel spanning the earliest to the latest recorded time.

use axum::{
  extract::{Query, State},
  response::Response,
};
use fdsn_core::{model::AvailabilityRecord, store::AvailabilityStore};

use crate::{
  AppState,
  error::{Error, Result},
  handlers::{text_response, version_response},
  params::{RawParams, Selection},
  text,
};

pub const VERSION: &str = "1.0.0";

pub async fn version() -> Response { version_response(VERSION) }

fn select(rows: Vec<AvailabilityRecord>, sel: &Selection) -> Vec<AvailabilityRecord> {
  rows
    .into_iter()
    .filter(|a| {
      sel.station_matches(&a.network_code, &a.station_code)
        && sel.channel_matches(&a.location_code, &a.channel_code)
        && sel.overlaps(Some(a.earliest), Some(a.latest))
    })
    .collect()
}

/// `GET|POST /availability/1/query`
pub async fn query<S>(
  State(state): State<AppState<S>>,
  Query(raw): Query<RawParams>,
) -> Result<Response>
where
  S: AvailabilityStore,
{
  let sel = Selection::parse(&raw)?;
  let rows = state.store.availability_records().await.map_err(Error::store)?;
  Ok(text_response(text::availability(&select(rows, &sel))))
}

/// `GET|POST /availability/1/extent`
pub async fn extent<S>(
  State(state): State<AppState<S>>,
  Query(raw): Query<RawParams>,
) -> Result<Response>
where
  S: AvailabilityStore,
{
  let sel = Selection::parse(&raw)?;
  let rows = state.store.availability_extents().await.map_err(Error::store)?;
  Ok(text_response(text::availability(&select(rows, &sel))))
}
