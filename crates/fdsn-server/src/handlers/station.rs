//! `fdsnws/station/1/query`: stored metadata as FDSN text or StationXML.

use std::collections::{HashMap, HashSet};

use axum::{
  extract::{Query, State},
  response::Response,
};
use chrono::Utc;
use fdsn_core::{
  model::{ChannelRecord, Level, NetworkSummary, StationRecord},
  store::MetadataStore,
};

use crate::{
  AppState,
  error::{Error, Result},
  handlers::{text_response, version_response, xml_response},
  params::{Format, RawParams, StationParams},
  text,
  xml::{self, NetworkNode, StationNode, StationXml},
};

pub const VERSION: &str = "1.1.0";

pub async fn version() -> Response { version_response(VERSION) }

/// `GET|POST /station/1/query`
pub async fn query<S>(
  State(state): State<AppState<S>>,
  Query(raw): Query<RawParams>,
) -> Result<Response>
where
  S: MetadataStore,
{
  let params = StationParams::parse(&raw)?;
  let store = state.store.as_ref();
  tracing::debug!(level = %params.level, format = %params.format, "station query");

  match params.format {
    Format::Text => {
      let body = match params.level {
        Level::Network => text::networks(&networks(store, &params).await?),
        Level::Station => text::stations(&stations(store, &params).await?),
        Level::Channel => {
          let stations = stations(store, &params).await?;
          text::channels(&channels(store, &params, &stations).await?)
        }
      };
      Ok(text_response(body))
    }
    Format::Xml => {
      let networks = networks(store, &params).await?;
      let stations = match params.level {
        Level::Network => Vec::new(),
        _ => stations(store, &params).await?,
      };
      let channels = match params.level {
        Level::Channel => channels(store, &params, &stations).await?,
        _ => Vec::new(),
      };
      let doc = StationXml {
        source:   &state.config.xml_source,
        sender:   &state.config.xml_sender,
        created:  Utc::now(),
        networks: tree(params.level, &networks, &stations, &channels),
      };
      Ok(xml_response(xml::render(&doc)?))
    }
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

async fn networks<S: MetadataStore>(store: &S, p: &StationParams) -> Result<Vec<NetworkSummary>> {
  let sel = &p.selection;
  Ok(
    store
      .network_summaries()
      .await
      .map_err(Error::store)?
      .into_iter()
      .filter(|n| sel.network_matches(&n.code) && sel.overlaps(n.start_time, n.end_time))
      .collect(),
  )
}

async fn stations<S: MetadataStore>(store: &S, p: &StationParams) -> Result<Vec<StationRecord>> {
  let sel = &p.selection;
  Ok(
    store
      .station_records()
      .await
      .map_err(Error::store)?
      .into_iter()
      .filter(|s| {
        sel.station_matches(&s.network_code, &s.code)
          && sel.overlaps(s.start_time, s.end_time)
          && p.bbox.contains(s.latitude, s.longitude)
      })
      .collect(),
  )
}

/// Channels of the already-selected `stations` that pass the location,
/// channel and time filters.
async fn channels<S: MetadataStore>(
  store: &S,
  p: &StationParams,
  stations: &[StationRecord],
) -> Result<Vec<ChannelRecord>> {
  let sel = &p.selection;
  let selected: HashSet<i64> = stations.iter().map(|s| s.station_id).collect();
  Ok(
    store
      .channel_records()
      .await
      .map_err(Error::store)?
      .into_iter()
      .filter(|c| {
        selected.contains(&c.station_id)
          && sel.channel_matches(&c.location_code, &c.code)
          && sel.overlaps(c.start_time, c.end_time)
      })
      .collect(),
  )
}

/// Nest flat records into the StationXML hierarchy. Below network level,
/// branches left empty by the filters are pruned.
fn tree<'a>(
  level: Level,
  networks: &'a [NetworkSummary],
  stations: &'a [StationRecord],
  channels: &'a [ChannelRecord],
) -> Vec<NetworkNode<'a>> {
  let mut by_station: HashMap<i64, Vec<&ChannelRecord>> = HashMap::new();
  for c in channels {
    by_station.entry(c.station_id).or_default().push(c);
  }

  let mut by_network: HashMap<&str, Vec<StationNode<'_>>> = HashMap::new();
  for s in stations {
    let channels = by_station.remove(&s.station_id).unwrap_or_default();
    if level == Level::Channel && channels.is_empty() {
      continue;
    }
    by_network
      .entry(s.network_code.as_str())
      .or_default()
      .push(StationNode { station: s, channels });
  }

  networks
    .iter()
    .filter_map(|n| {
      let stations = by_network.remove(n.code.as_str()).unwrap_or_default();
      if level != Level::Network && stations.is_empty() {
        return None;
      }
      Some(NetworkNode { network: n, stations })
    })
    .collect()
}
