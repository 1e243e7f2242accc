use std::collections::{HashMap, HashSet};

use fdsn_client::{
  AvailabilityQuery, ChannelRow, FdsnClient, NetworkRow, StationQuery, StationRow,
};
use fdsn_core::{
  model::{AvailabilityItem, ImportChannel, Source},
  store::{AvailabilityStore, MetadataStore},
};

use crate::{
  ImportError, Result,
  report::{AvailabilityOutcome, ImportReport, SoftCondition},
};

/// Merges one upstream's channel metadata into a store.
///
/// Holds only borrows, so it is built per request and dropped afterwards;
/// nothing is cached between runs.
pub struct Importer<'a, S, A = S> {
  client:       &'a FdsnClient,
  store:        &'a S,
  availability: Option<&'a A>,
}

impl<'a, S> Importer<'a, S> {
  pub fn new(client: &'a FdsnClient, store: &'a S) -> Self {
    Self { client, store, availability: None }
  }
}

impl<'a, S, A> Importer<'a, S, A> {
  /// Also reconcile availability extents into `availability` after each
  /// import.
  pub fn with_availability<B>(self, availability: &'a B) -> Importer<'a, S, B> {
    Importer { client: self.client, store: self.store, availability: Some(availability) }
  }
}

impl<S, A> Importer<'_, S, A>
where
  S: MetadataStore,
  A: AvailabilityStore,
{
  /// Fetch, merge, and reconcile everything `query` selects from `source`.
  pub async fn run(&self, source: &Source, query: &StationQuery) -> Result<ImportReport> {
    let channels = self
      .client
      .query_channels(query)
      .await
      .map_err(|source_err| ImportError::Fetch {
        source_name: source.name.clone(),
        source:      source_err,
      })?;

    if channels.is_empty() {
      tracing::info!(source = %source.name, "upstream returned no channels");
      let outcome = self
        .availability
        .map(|_| AvailabilityOutcome { count: 0, last: None });
      return Ok(ImportReport::new(0, outcome));
    }

    tracing::info!(source = %source.name, channels = channels.len(), "importing stations");

    let rows = self.enrich(source, query, &channels).await;
    let imported = self.import_rows(source, rows).await?;

    let outcome = match self.availability {
      Some(availability) => Some(self.reconcile_availability(availability, source, &channels).await),
      None => None,
    };

    let report = ImportReport::new(imported, outcome);
    tracing::info!(
      source = %source.name,
      imported = report.imported,
      availability = report.availability_count,
      status = %report.availability_status,
      "import complete"
    );
    Ok(report)
  }

  /// Write `rows` for `source` in one transaction.
  pub async fn import_rows(&self, source: &Source, rows: Vec<ImportChannel>) -> Result<usize> {
    self
      .store
      .import_channels(source.id, rows)
      .await
      .map_err(|e| ImportError::Store { source_name: source.name.clone(), source: Box::new(e) })
  }

  /// Attach station and network metadata that the channel-level text
  /// rendering lacks. Both lookups are optional.
  async fn enrich(
    &self,
    source: &Source,
    query: &StationQuery,
    channels: &[ChannelRow],
  ) -> Vec<ImportChannel> {
    let stations: HashMap<(String, String), StationRow> = match self.client.query_stations(query).await {
      Ok(rows) => rows
        .into_iter()
        .map(|r| ((r.network.clone(), r.station.clone()), r))
        .collect(),
      Err(e) => {
        tracing::warn!(source = %source.name, error = %e, "station enrichment failed");
        HashMap::new()
      }
    };

    let network_query = StationQuery { network: query.network.clone(), ..Default::default() };
    let networks: HashMap<String, NetworkRow> = match self.client.query_networks(&network_query).await {
      Ok(rows) => rows.into_iter().map(|r| (r.code.clone(), r)).collect(),
      Err(e) => {
        tracing::warn!(source = %source.name, error = %e, "network enrichment failed");
        HashMap::new()
      }
    };

    channels
      .iter()
      .map(|ch| {
        let station = stations.get(&(ch.network.clone(), ch.station.clone()));
        to_import(ch, station, networks.get(&ch.network))
      })
      .collect()
  }

  /// Fetch extents for every (network, station) in `channels`, match them
  /// to stored channel ids, and upsert the matches as one batch.
  async fn reconcile_availability(
    &self,
    availability: &A,
    source: &Source,
    channels: &[ChannelRow],
  ) -> AvailabilityOutcome {
    let mut last = None;
    let mut items = Vec::new();

    for (network, station) in station_pairs(channels) {
      let query = AvailabilityQuery {
        network: Some(network.to_string()),
        station: Some(station.to_string()),
        ..Default::default()
      };

      let extents = match self.client.query_availability_extent(&query).await {
        Ok(extents) => extents,
        Err(e) if e.is_not_supported() => {
          tracing::info!(network, station, "availability not supported by source");
          last = Some(SoftCondition::NotSupported(
            "availability not supported by this source".to_string(),
          ));
          continue;
        }
        Err(e) => {
          tracing::warn!(network, station, error = %e, "failed to fetch availability extent");
          last = Some(SoftCondition::Failed(format!(
            "availability fetch error for {network}.{station}: {e}"
          )));
          continue;
        }
      };

      if extents.is_empty() {
        continue;
      }

      let ids = match self
        .store
        .lookup_channel_ids(source.id, network.to_string(), station.to_string())
        .await
      {
        Ok(ids) => ids,
        Err(e) => {
          tracing::warn!(network, station, error = %e, "failed to look up channel ids");
          last = Some(SoftCondition::Failed(format!(
            "channel lookup error for {network}.{station}: {e}"
          )));
          continue;
        }
      };

      items.extend(extents.into_iter().filter_map(|ext| {
        let channel_id = *ids.get(&format!("{}.{}", ext.location, ext.channel))?;
        let (earliest, latest) = (ext.earliest?, ext.latest?);
        if earliest > latest {
          tracing::debug!(
            network,
            station,
            location = %ext.location,
            channel = %ext.channel,
            "skipping inverted availability extent"
          );
          return None;
        }
        Some(AvailabilityItem { channel_id, earliest, latest })
      }));
    }

    let mut count = items.len();
    if !items.is_empty() {
      if let Err(e) = availability.upsert_availability(items).await {
        tracing::warn!(items = count, error = %e, "failed to upsert availability batch");
        last = Some(SoftCondition::Failed(format!("availability upsert error: {e}")));
        count = 0;
      }
    }

    tracing::info!(source = %source.name, records = count, "availability import complete");
    AvailabilityOutcome { count, last }
  }
}

/// Unique (network, station) pairs in first-seen order.
fn station_pairs(channels: &[ChannelRow]) -> Vec<(&str, &str)> {
  let mut seen = HashSet::new();
  channels
    .iter()
    .map(|ch| (ch.network.as_str(), ch.station.as_str()))
    .filter(|pair| seen.insert(*pair))
    .collect()
}

fn to_import(
  ch: &ChannelRow,
  station: Option<&StationRow>,
  network: Option<&NetworkRow>,
) -> ImportChannel {
  ImportChannel {
    network_code:        ch.network.clone(),
    network_description: network.map(|n| n.description.clone()),
    network_start:       network.and_then(|n| n.start_time),
    network_end:         network.and_then(|n| n.end_time),

    station_code:        ch.station.clone(),
    station_latitude:    station.map_or(ch.latitude, |s| s.latitude),
    station_longitude:   station.map_or(ch.longitude, |s| s.longitude),
    station_elevation:   station.map_or(ch.elevation, |s| s.elevation),
    site_name:           station.map(|s| s.site_name.clone()),
    station_start:       station.and_then(|s| s.start_time),
    station_end:         station.and_then(|s| s.end_time),

    location_code:       ch.location.clone(),
    channel_code:        ch.channel.clone(),
    latitude:            Some(ch.latitude),
    longitude:           Some(ch.longitude),
    elevation:           Some(ch.elevation),
    depth:               Some(ch.depth),
    azimuth:             Some(ch.azimuth),
    dip:                 Some(ch.dip),
    sensor_description:  ch.sensor_description.clone(),
    scale:               Some(ch.scale),
    scale_freq:          Some(ch.scale_freq),
    scale_units:         ch.scale_units.clone(),
    sample_rate:         Some(ch.sample_rate),
    start_time:          ch.start_time,
    end_time:            ch.end_time,
  }
}
