//! The `MetadataStore` and `AvailabilityStore` traits.
//!
//! Implemented by storage backends (e.g. `fdsn-store-sqlite`). The import
//! pipeline is the only writer of networks, stations, channels and extents;
//! the protocol server and the management API only read.

use std::{collections::HashMap, future::Future};

use crate::model::{
  AvailabilityItem, AvailabilityRecord, ChannelAvailability, ChannelRecord, ImportChannel,
  Network, NetworkSummary, NewSource, Source, SourceNetwork, SourceSummary, StationDetail,
  StationFilter, StationPage, StationRecord, Stats,
};

// ─── Metadata ────────────────────────────────────────────────────────────────

/// Abstraction over the normalized metadata store.
///
/// All methods return `Send` futures so implementations can be shared across
/// a multi-threaded runtime behind an `Arc`.
pub trait MetadataStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sources ───────────────────────────────────────────────────────────

  /// All sources with their import counts, ordered by name.
  fn list_sources(
    &self,
  ) -> impl Future<Output = Result<Vec<SourceSummary>, Self::Error>> + Send + '_;

  fn get_source(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Source>, Self::Error>> + Send + '_;

  /// Look up a source by its exact base URL.
  fn find_source_by_url(
    &self,
    base_url: String,
  ) -> impl Future<Output = Result<Option<Source>, Self::Error>> + Send + '_;

  fn create_source(
    &self,
    input: NewSource,
  ) -> impl Future<Output = Result<Source, Self::Error>> + Send + '_;

  /// Overwrite a source's editable fields. Returns `None` if `id` is unknown.
  fn update_source(
    &self,
    id: i64,
    input: NewSource,
  ) -> impl Future<Output = Result<Option<Source>, Self::Error>> + Send + '_;

  /// Delete a source and, by cascade, everything imported from it.
  /// Returns `false` if nothing was deleted.
  fn delete_source(&self, id: i64) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The source that owns a network with this code, if any. When several
  /// sources carry the same code the lowest source id wins.
  fn network_owner(
    &self,
    network_code: String,
  ) -> impl Future<Output = Result<Option<Source>, Self::Error>> + Send + '_;

  // ── Import ────────────────────────────────────────────────────────────

  /// Merge `channels` into the store for `source_id` in one transaction.
  ///
  /// Networks and stations are merged on their natural keys; channels are
  /// replaced wholesale. Either every row is written or none is. Returns
  /// the number of channel rows written.
  fn import_channels(
    &self,
    source_id: i64,
    channels: Vec<ImportChannel>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Channel ids of one (source, network, station), keyed by
  /// `"{location_code}.{channel_code}"`.
  fn lookup_channel_ids(
    &self,
    source_id: i64,
    network_code: String,
    station_code: String,
  ) -> impl Future<Output = Result<HashMap<String, i64>, Self::Error>> + Send + '_;

  // ── Browsing ──────────────────────────────────────────────────────────

  fn list_networks(
    &self,
    source_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Network>, Self::Error>> + Send + '_;

  fn list_stations(
    &self,
    filter: StationFilter,
  ) -> impl Future<Output = Result<StationPage, Self::Error>> + Send + '_;

  /// A station with its channels. `availability` is left empty.
  fn get_station(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<StationDetail>, Self::Error>> + Send + '_;

  fn delete_station(&self, id: i64) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_source_networks(
    &self,
  ) -> impl Future<Output = Result<Vec<SourceNetwork>, Self::Error>> + Send + '_;

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;

  // ── Protocol reads ────────────────────────────────────────────────────

  /// One summary per distinct network code, ordered by code.
  fn network_summaries(
    &self,
  ) -> impl Future<Output = Result<Vec<NetworkSummary>, Self::Error>> + Send + '_;

  /// Every station, ordered by network code then station code.
  fn station_records(
    &self,
  ) -> impl Future<Output = Result<Vec<StationRecord>, Self::Error>> + Send + '_;

  /// Every channel, ordered by network, station, location and channel code.
  fn channel_records(
    &self,
  ) -> impl Future<Output = Result<Vec<ChannelRecord>, Self::Error>> + Send + '_;
}

// ─── Availability ────────────────────────────────────────────────────────────

/// Storage for per-channel availability extents.
pub trait AvailabilityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Upsert `items` in a single transaction, keyed on
  /// (channel id, earliest). An existing extent's `latest` only ever grows.
  /// Returns the number of items written.
  fn upsert_availability(
    &self,
    items: Vec<AvailabilityItem>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Every channel of a station left-joined with its extents, ordered by
  /// location code then channel code.
  fn station_availability(
    &self,
    station_id: i64,
  ) -> impl Future<Output = Result<Vec<ChannelAvailability>, Self::Error>> + Send + '_;

  /// Every stored extent, ordered by network, station, location and channel.
  fn availability_records(
    &self,
  ) -> impl Future<Output = Result<Vec<AvailabilityRecord>, Self::Error>> + Send + '_;

  /// One extent per channel spanning MIN(earliest) to MAX(latest).
  fn availability_extents(
    &self,
  ) -> impl Future<Output = Result<Vec<AvailabilityRecord>, Self::Error>> + Send + '_;
}
